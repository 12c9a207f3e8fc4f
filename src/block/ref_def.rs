//! Link reference definitions.
//!
//! Definitions are eaten from the stream; they produce no token, only
//! an entry in the document's reference map.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::escape::{decode_entities, encode_url};
use crate::scan;
use crate::state::BlockState;

/// `[label]: destination "optional title"`, title possibly on the next
/// line.
pub struct RefDef;

impl BlockRule for RefDef {
    fn name(&self) -> &'static str {
        "ref_def"
    }

    fn priority(&self) -> u8 {
        70
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if state.has_open_paragraph() {
            return Ok(false);
        }

        let parsed = {
            let line = state.line();
            if scan::indent_width(line) > 3
                || !line.trim_start_matches([' ', '\t']).starts_with('[')
            {
                return Ok(false);
            }
            parse_def(&state.src, state.cursor)
        };
        let Some(def) = parsed else {
            return Ok(false);
        };

        state.add_def(&def.label, def.url, def.title);
        state.cursor = def.end;
        Ok(true)
    }
}

struct ParsedDef {
    label: String,
    url: String,
    title: Option<String>,
    /// Cursor position after the definition (start of the next line).
    end: usize,
}

fn parse_def(src: &str, start: usize) -> Option<ParsedDef> {
    let bytes = src.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let (label, after_label) = scan::link_label(src, pos + 1)?;
    if label.trim().is_empty() {
        return None;
    }
    if bytes.get(after_label) != Some(&b':') {
        return None;
    }
    let label = label.to_owned();

    let dest_at = scan::skip_spaces_and_newline(src, after_label + 1);
    let (dest, after_dest) = scan::link_destination(src, dest_at)?;
    let url = encode_url(&decode_entities(&scan::unescape(dest)));

    // Optional title, separated by whitespace, possibly on the next line.
    let title_at = scan::skip_spaces_and_newline(src, after_dest);
    if title_at > after_dest {
        if let Some((title, after_title)) = scan::link_title(src, title_at) {
            if rest_of_line_blank(src, after_title) {
                let title = decode_entities(&scan::unescape(title)).into_owned();
                return Some(ParsedDef {
                    label,
                    url,
                    title: Some(title),
                    end: next_line_start(src, after_title),
                });
            }
        }
    }

    // No (valid) title: the destination must end its line.
    if !rest_of_line_blank(src, after_dest) {
        return None;
    }
    Some(ParsedDef {
        label,
        url,
        title: None,
        end: next_line_start(src, after_dest),
    })
}

fn rest_of_line_blank(src: &str, pos: usize) -> bool {
    for b in src[pos..].bytes() {
        match b {
            b' ' | b'\t' => {}
            b'\n' => return true,
            _ => return false,
        }
    }
    true
}

fn next_line_start(src: &str, pos: usize) -> usize {
    memchr::memchr(b'\n', src[pos..].as_bytes()).map_or(src.len(), |at| pos + at + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Env;

    fn parse_env(src: &str) -> Env {
        let mut env = Env::default();
        {
            let mut state = BlockState::new(src, &mut env);
            BlockParser::new().parse(&mut state).expect("parse");
        }
        env
    }

    #[test]
    fn basic_definition() {
        let env = parse_env("[bar]: /url \"t\"");
        let link = env.get_ref("bar").expect("defined");
        assert_eq!(link.url, "/url");
        assert_eq!(link.title.as_deref(), Some("t"));
    }

    #[test]
    fn definition_without_title() {
        let env = parse_env("[a]: <my url>");
        assert_eq!(env.get_ref("a").map(|r| r.url.as_str()), Some("my%20url"));
    }

    #[test]
    fn title_on_next_line() {
        let env = parse_env("[a]: /url\n\"title\"");
        let link = env.get_ref("a").expect("defined");
        assert_eq!(link.title.as_deref(), Some("title"));
    }

    #[test]
    fn trailing_garbage_rejects_definition() {
        let env = parse_env("[a]: /url extra");
        assert!(env.get_ref("a").is_none());
    }

    #[test]
    fn labels_are_case_folded() {
        let env = parse_env("[ÄGYPTEN]: /x");
        assert!(env.get_ref("ägypten").is_some());
    }

    #[test]
    fn first_definition_wins() {
        let env = parse_env("[a]: /one\n[a]: /two");
        assert_eq!(env.get_ref("a").map(|r| r.url.as_str()), Some("/one"));
    }
}
