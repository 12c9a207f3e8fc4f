//! Fenced code blocks.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// ```` ``` ```` or `~~~` fences with an optional info string.
pub struct FencedCode;

/// Fence marker at the start of a whitespace-trimmed line:
/// `(fence char, run length, info string)`.
pub(super) fn fence_open(trimmed: &str) -> Option<(u8, usize, &str)> {
    let bytes = trimmed.as_bytes();
    let marker = match bytes.first().copied() {
        Some(b @ (b'`' | b'~')) => b,
        _ => return None,
    };
    let mut len = 0;
    while len < bytes.len() && bytes[len] == marker {
        len += 1;
    }
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    // A backtick info string cannot contain a backtick.
    if marker == b'`' && info.contains('`') {
        return None;
    }
    Some((marker, len, info))
}

impl BlockRule for FencedCode {
    fn name(&self) -> &'static str {
        "fenced_code"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let line = state.line();
        let indent = scan::indent_width(line);
        if indent > 3 {
            return Ok(false);
        }
        let trimmed = line.trim_start_matches([' ', '\t']);
        let Some((marker, fence_len, info)) = fence_open(trimmed) else {
            return Ok(false);
        };
        let info = info.to_owned();
        state.advance_line();

        let mut content = String::new();
        while !state.eof() {
            let line = state.line();
            if is_closing_fence(line, marker, fence_len) {
                state.advance_line();
                break;
            }
            content.push_str(&scan::strip_columns(line, indent));
            content.push('\n');
            state.advance_line();
        }

        let mut token = Token::text_leaf("block_code", content);
        if !info.is_empty() {
            token.set_attr("info", info);
        }
        state.append(token);
        Ok(true)
    }
}

fn is_closing_fence(line: &str, marker: u8, open_len: usize) -> bool {
    if scan::indent_width(line) > 3 {
        return false;
    }
    let trimmed = line.trim_start_matches([' ', '\t']);
    let bytes = trimmed.as_bytes();
    let mut len = 0;
    while len < bytes.len() && bytes[len] == marker {
        len += 1;
    }
    len >= open_len && trimmed[len..].trim().is_empty()
}
