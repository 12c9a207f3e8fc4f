//! `<scheme:...>` and `<email@host>` autolinks.

use crate::escape::encode_url;
use crate::inline::InlineRule;
use crate::scan;
use crate::state::InlineState;
use crate::token::Token;

/// Angle-bracket autolinks.
pub struct Autolink;

impl InlineRule for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn priority(&self) -> u8 {
        30
    }

    fn triggers(&self) -> &'static [u8] {
        b"<"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        if let Some((uri, end)) = scan::autolink_uri(&state.src, state.pos) {
            let text = uri.to_owned();
            let url = encode_url(&text);
            state.append(autolink_token(url, text));
            return Some(end);
        }
        if let Some((addr, end)) = scan::autolink_email(&state.src, state.pos) {
            let text = addr.to_owned();
            let url = encode_url(&format!("mailto:{text}"));
            state.append(autolink_token(url, text));
            return Some(end);
        }
        None
    }
}

fn autolink_token(url: String, text: String) -> Token {
    Token::container("link", vec![Token::text_leaf("text", text)]).with_attr("url", url)
}

#[cfg(test)]
mod tests {
    use crate::inline::InlineParser;
    use crate::state::{Env, InlineState};
    use crate::token::Token;

    fn parse(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        let mut state = InlineState::new(src, &mut env);
        InlineParser::new().parse(&mut state);
        state.into_tokens()
    }

    #[test]
    fn uri_autolink() {
        let tokens = parse("<https://example.com>");
        assert_eq!(tokens[0].kind, "link");
        assert_eq!(tokens[0].attr_str("url"), Some("https://example.com"));
        let children = tokens[0].children.as_deref().expect("children");
        assert_eq!(children[0].text.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn email_autolink() {
        let tokens = parse("<user@example.com>");
        assert_eq!(tokens[0].attr_str("url"), Some("mailto:user@example.com"));
    }

    #[test]
    fn spaces_break_autolink() {
        let tokens = parse("<not a link>");
        assert!(tokens.iter().all(|t| t.kind != "link"));
    }
}
