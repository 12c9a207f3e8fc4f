//! ATX and setext headings.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// `# heading` through `###### heading`, with optional closing hashes.
pub struct AtxHeading;

/// Returns the heading level if `trimmed` opens an ATX heading.
pub(super) fn atx_level(trimmed: &str) -> Option<u8> {
    let bytes = trimmed.as_bytes();
    let mut level = 0usize;
    while level < bytes.len() && bytes[level] == b'#' {
        level += 1;
    }
    if level == 0 || level > 6 {
        return None;
    }
    match bytes.get(level).copied() {
        None | Some(b' ') | Some(b'\t') => Some(level as u8),
        _ => None,
    }
}

impl BlockRule for AtxHeading {
    fn name(&self) -> &'static str {
        "atx_heading"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let line = state.line();
        if scan::indent_width(line) > 3 {
            return Ok(false);
        }
        let trimmed = line.trim_start_matches([' ', '\t']);
        let Some(level) = atx_level(trimmed) else {
            return Ok(false);
        };

        let content = trimmed[level as usize..].trim_start_matches([' ', '\t']);
        let content = trim_closing_hashes(content).to_owned();
        state.advance_line();

        let token = Token::text_leaf("heading", content).with_attr("level", i64::from(level));
        state.append(token);
        Ok(true)
    }
}

/// Strip a trailing run of `#` preceded by a space (or standing alone).
fn trim_closing_hashes(content: &str) -> &str {
    let trimmed = content.trim_end_matches([' ', '\t']);
    let without = trimmed.trim_end_matches('#');
    if without.len() == trimmed.len() {
        return trimmed;
    }
    if without.is_empty() {
        return "";
    }
    if without.ends_with([' ', '\t']) {
        without.trim_end_matches([' ', '\t'])
    } else {
        trimmed
    }
}

/// A paragraph followed by a `=` or `-` underline becomes a heading.
pub struct SetextHeading;

impl BlockRule for SetextHeading {
    fn name(&self) -> &'static str {
        "setext_heading"
    }

    fn priority(&self) -> u8 {
        30
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if !state.has_open_paragraph() {
            return Ok(false);
        }
        let line = state.line();
        if scan::indent_width(line) > 3 {
            return Ok(false);
        }
        let trimmed = line.trim();
        let level: i64 = if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'=') {
            1
        } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'-') {
            2
        } else {
            return Ok(false);
        };

        let text = state
            .take_paragraph()
            .unwrap_or_default();
        state.advance_line();
        state.append(Token::text_leaf("heading", text).with_attr("level", level));
        Ok(true)
    }
}
