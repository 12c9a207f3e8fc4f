//! Bare-URL linkify.
//!
//! Turns `http://`, `https://` and `www.` runs into links without the
//! `<...>` envelope, trimming trailing punctuation the way GFM does.

use std::sync::Arc;

use crate::escape::encode_url;
use crate::inline::InlineRule;
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::state::InlineState;
use crate::token::Token;

/// Bare URL detection.
pub struct Linkify;

impl Plugin for Linkify {
    fn name(&self) -> &'static str {
        "linkify"
    }

    fn setup(&self, md: &mut Markdown) {
        md.inline_rule(Arc::new(BareUrl));
    }
}

struct BareUrl;

impl InlineRule for BareUrl {
    fn name(&self) -> &'static str {
        "linkify"
    }

    fn priority(&self) -> u8 {
        45
    }

    fn triggers(&self) -> &'static [u8] {
        b"hw"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let pos = state.pos;
        let rest = &state.src[pos..];
        let www = if rest.starts_with("http://") || rest.starts_with("https://") {
            false
        } else if rest.starts_with("www.") {
            true
        } else {
            return None;
        };

        // Must start at a word boundary.
        let before = state.src[..pos].chars().next_back();
        if before.is_some_and(char::is_alphanumeric) {
            return None;
        }

        let bytes = rest.as_bytes();
        let mut end = 0;
        while end < bytes.len() && !matches!(bytes[end], b' ' | b'\t' | b'\n' | b'<') {
            end += 1;
        }
        let end = trim_trailing_punct(&rest[..end]);
        let candidate = &rest[..end];
        // Require a dot past the scheme so `http://` alone stays text.
        let host = candidate
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        if !host.contains('.') || host.starts_with('.') {
            return None;
        }

        let text = candidate.to_owned();
        let url = if www {
            encode_url(&format!("http://{text}"))
        } else {
            encode_url(&text)
        };
        state.append(
            Token::container("link", vec![Token::text_leaf("text", text)]).with_attr("url", url),
        );
        Some(pos + end)
    }
}

/// Trim GFM trailing punctuation; a `)` only counts while unbalanced.
fn trim_trailing_punct(candidate: &str) -> usize {
    let bytes = candidate.as_bytes();
    let mut end = bytes.len();
    loop {
        if end == 0 {
            break;
        }
        match bytes[end - 1] {
            b'.' | b',' | b';' | b':' | b'!' | b'?' | b'\'' | b'"' | b'*' | b'_' | b'~' => {
                end -= 1;
            }
            b')' => {
                let opens = bytes[..end].iter().filter(|&&b| b == b'(').count();
                let closes = bytes[..end].iter().filter(|&&b| b == b')').count();
                if closes > opens {
                    end -= 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_html(src: &str) -> String {
        Markdown::new()
            .plugin(Linkify)
            .convert(src)
            .expect("convert")
    }

    #[test]
    fn bare_https_url() {
        let html = to_html("see https://example.com/x now");
        assert!(html.contains("<a href=\"https://example.com/x\">https://example.com/x</a>"));
    }

    #[test]
    fn www_url_gets_scheme() {
        let html = to_html("www.example.com");
        assert!(html.contains("<a href=\"http://www.example.com\">www.example.com</a>"));
    }

    #[test]
    fn trailing_period_excluded() {
        let html = to_html("go to https://example.com.");
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("</a>."));
    }

    #[test]
    fn balanced_parens_kept() {
        let html = to_html("https://en.wikipedia.org/wiki/X_(Y)");
        assert!(html.contains("wiki/X_(Y)</a>"));
    }

    #[test]
    fn plain_words_unaffected() {
        let html = to_html("however the width");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn mid_word_not_linkified() {
        let html = to_html("xhttps://example.com");
        assert!(!html.contains("<a "));
    }
}
