//! Bullet and ordered lists.
//!
//! Items are collected as prefix-stripped sub-sources and block-parsed
//! recursively. Tightness is recomputed when the list closes: a list is
//! loose if a blank line separates two items, or if any item contains a
//! blank-line-separated pair of block-level children.

use std::borrow::Cow;

use crate::block::{interrupts_paragraph, thematic, BlockParser, BlockRule};
use crate::error::Error;
use crate::limits;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// A parsed list marker.
#[derive(Debug, Clone, Copy)]
pub(super) struct ListMarker {
    /// Ordered (`1.` / `1)`) vs bullet (`-`, `+`, `*`).
    pub ordered: bool,
    /// Start number; 1 for bullets.
    pub start: i64,
    /// Bullet character, or the delimiter (`.` / `)`) for ordered lists.
    pub bullet: u8,
    /// Column where item content begins (the continuation column).
    pub content_col: usize,
}

/// Parse a list marker at the start of `line`; returns the marker and
/// the first line of item content (prefix-stripped).
pub(super) fn list_marker(line: &str) -> Option<(ListMarker, Cow<'_, str>)> {
    let indent = scan::indent_width(line);
    if indent > 3 {
        return None;
    }
    let trimmed = line.trim_start_matches([' ', '\t']);
    let bytes = trimmed.as_bytes();

    let (ordered, start, marker_len, bullet) = match *bytes.first()? {
        b @ (b'-' | b'+' | b'*') => (false, 1, 1, b),
        b if b.is_ascii_digit() => {
            let mut digits = 1;
            while digits < bytes.len() && bytes[digits].is_ascii_digit() {
                digits += 1;
            }
            if digits > limits::MAX_LIST_MARKER_DIGITS {
                return None;
            }
            let delim = *bytes.get(digits)?;
            if delim != b'.' && delim != b')' {
                return None;
            }
            let start: i64 = trimmed[..digits].parse().ok()?;
            (true, start, digits + 1, delim)
        }
        _ => return None,
    };

    let after = &trimmed[marker_len..];
    if after.is_empty() {
        let marker = ListMarker {
            ordered,
            start,
            bullet,
            content_col: indent + marker_len + 1,
        };
        return Some((marker, Cow::Borrowed("")));
    }
    if !after.starts_with([' ', '\t']) {
        return None;
    }

    let pad = scan::indent_width(after);
    // Five or more spaces after the marker means the item starts with
    // indented code: content begins one column past the marker.
    let padding = if pad >= 5 || scan::is_blank(after) { 1 } else { pad };
    let marker = ListMarker {
        ordered,
        start,
        bullet,
        content_col: indent + marker_len + padding,
    };
    Some((marker, scan::strip_columns(after, padding)))
}

/// The list rule.
pub struct List;

impl BlockRule for List {
    fn name(&self) -> &'static str {
        "list"
    }

    fn priority(&self) -> u8 {
        90
    }

    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if state.depth >= limits::MAX_BLOCK_NESTING {
            return Ok(false);
        }
        let (first, first_empty) = {
            let Some((marker, content)) = list_marker(state.line()) else {
                return Ok(false);
            };
            (marker, content.trim().is_empty())
        };
        if state.has_open_paragraph() && (first_empty || (first.ordered && first.start != 1)) {
            return Ok(false);
        }

        let ordered = first.ordered;
        let bullet = first.bullet;
        let mut items: Vec<(String, bool)> = Vec::new();
        let mut loose = false;
        let mut done = false;

        while !done {
            let Some((marker, content)) = list_marker(state.line()) else {
                break;
            };
            if marker.ordered != ordered || marker.bullet != bullet {
                break;
            }
            let content_col = marker.content_col;
            let mut lines = vec![content.into_owned()];
            state.advance_line();

            let mut blanks = 0usize;
            let mut internal_blank = false;
            let mut next_item = false;
            while !state.eof() {
                let line = state.line();
                if scan::is_blank(line) {
                    blanks += 1;
                    state.advance_line();
                    continue;
                }
                if scan::indent_width(line) >= content_col {
                    if blanks > 0 {
                        internal_blank = true;
                        for _ in 0..blanks {
                            lines.push(String::new());
                        }
                        blanks = 0;
                    }
                    lines.push(scan::strip_columns(line, content_col).into_owned());
                    state.advance_line();
                    continue;
                }
                if thematic::thematic_line(line) {
                    done = true;
                    break;
                }
                if let Some((next, _)) = list_marker(line) {
                    if next.ordered == ordered && next.bullet == bullet {
                        if blanks > 0 {
                            loose = true;
                        }
                        next_item = true;
                    } else {
                        done = true;
                    }
                    break;
                }
                let last_is_text = lines.last().is_some_and(|l| !l.trim().is_empty());
                if blanks == 0 && last_is_text && !interrupts_paragraph(line) {
                    // lazy paragraph continuation
                    lines.push(line.trim_start_matches([' ', '\t']).to_owned());
                    state.advance_line();
                    continue;
                }
                done = true;
                break;
            }
            if state.eof() && !next_item {
                done = true;
            }
            items.push((lines.join("\n"), internal_blank));
        }

        let mut item_tokens = Vec::with_capacity(items.len());
        for (src, internal_blank) in items {
            let children = parser.parse_child(state, src)?;
            if internal_blank && children.len() >= 2 {
                loose = true;
            }
            item_tokens.push(Token::container("list_item", children));
        }

        let tight = !loose;
        for item in &mut item_tokens {
            item.set_attr("tight", tight);
        }
        let mut list = Token::container("list", item_tokens)
            .with_attr("ordered", ordered)
            .with_attr("tight", tight)
            .with_attr("depth", state.depth as i64);
        if ordered {
            list.set_attr("start", first.start);
        }
        state.append(list);
        Ok(true)
    }
}
