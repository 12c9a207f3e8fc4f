//! GFM pipe tables.

use std::sync::Arc;

use crate::block::{interrupts_paragraph, BlockParser, BlockRule};
use crate::error::Error;
use crate::limits;
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// Tables with a header row, a delimiter row, and body rows.
///
/// Every row is normalized to the header's column count: missing cells
/// become empty, surplus cells are dropped.
pub struct Table;

impl Plugin for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn setup(&self, md: &mut Markdown) {
        md.block_rule(Arc::new(TableRule));
        md.inline_leaf("table_cell");
        md.render_method("table", Box::new(render_table));
        md.render_method("table_head", Box::new(render_head));
        md.render_method("table_body", Box::new(render_body));
        md.render_method("table_row", Box::new(render_row));
        md.render_method("table_cell", Box::new(render_cell));
    }
}

struct TableRule;

impl BlockRule for TableRule {
    fn name(&self) -> &'static str {
        "table"
    }

    fn priority(&self) -> u8 {
        100
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if state.has_open_paragraph() {
            return Ok(false);
        }
        let (header, aligns) = {
            let header_line = state.line();
            if !header_line.contains('|') || scan::indent_width(header_line) > 3 {
                return Ok(false);
            }
            let Some(delim_line) = state.peek_line(1) else {
                return Ok(false);
            };
            let Some(aligns) = parse_delimiter_row(delim_line) else {
                return Ok(false);
            };
            let header = split_row(header_line);
            if header.len() != aligns.len() || header.len() > limits::MAX_TABLE_COLUMNS {
                return Ok(false);
            }
            (header, aligns)
        };
        state.advance_line();
        state.advance_line();

        let columns = header.len();
        let mut rows: Vec<Vec<String>> = Vec::new();
        while !state.eof() {
            let line = state.line();
            if scan::is_blank(line) || interrupts_paragraph(line) {
                break;
            }
            rows.push(split_row(line));
            state.advance_line();
        }

        let head_cells = header
            .into_iter()
            .enumerate()
            .map(|(at, text)| cell_token(text, true, aligns[at].clone()))
            .collect();
        let head = Token::container("table_head", head_cells);

        let mut children = vec![head];
        if !rows.is_empty() {
            let row_tokens = rows
                .into_iter()
                .map(|mut cells| {
                    cells.resize(columns, String::new());
                    cells.truncate(columns);
                    let cell_tokens = cells
                        .into_iter()
                        .enumerate()
                        .map(|(at, text)| cell_token(text, false, aligns[at].clone()))
                        .collect();
                    Token::container("table_row", cell_tokens)
                })
                .collect();
            children.push(Token::container("table_body", row_tokens));
        }
        state.append(Token::container("table", children));
        Ok(true)
    }
}

fn cell_token(text: String, head: bool, align: Option<String>) -> Token {
    let mut token = Token::text_leaf("table_cell", text).with_attr("head", head);
    if let Some(align) = align {
        token.set_attr("align", align);
    }
    token
}

/// Parse the delimiter row into per-column alignment.
fn parse_delimiter_row(line: &str) -> Option<Vec<Option<String>>> {
    if scan::indent_width(line) > 3 {
        return None;
    }
    let cells = split_row(line);
    if cells.is_empty() {
        return None;
    }
    let mut aligns = Vec::with_capacity(cells.len());
    for cell in cells {
        let cell = cell.trim();
        let left = cell.starts_with(':');
        let right = cell.ends_with(':') && cell.len() > 1;
        let dashes = cell.trim_matches(':');
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        aligns.push(match (left, right) {
            (true, true) => Some("center".to_owned()),
            (true, false) => Some("left".to_owned()),
            (false, true) => Some("right".to_owned()),
            (false, false) => None,
        });
    }
    Some(aligns)
}

/// Split a row on unescaped pipes; `\|` becomes a literal pipe in the
/// cell. Boundary pipes are dropped.
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = trimmed.chars().peekable();
    let had_leading_pipe = trimmed.starts_with('|');
    if had_leading_pipe {
        chars.next();
    }
    let mut ended_with_pipe = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                cell.push('|');
            }
            '|' => {
                cells.push(cell.trim().to_owned());
                cell.clear();
                ended_with_pipe = chars.peek().is_none();
            }
            _ => cell.push(ch),
        }
    }
    if !ended_with_pipe {
        cells.push(cell.trim().to_owned());
    }
    cells
}

// --- renderer methods ---

fn render_table(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<table>\n");
    ctx.render_children(token)?;
    ctx.push_str("</table>\n");
    Ok(())
}

fn render_head(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<thead>\n<tr>\n");
    ctx.render_children(token)?;
    ctx.push_str("</tr>\n</thead>\n");
    Ok(())
}

fn render_body(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<tbody>\n");
    ctx.render_children(token)?;
    ctx.push_str("</tbody>\n");
    Ok(())
}

fn render_row(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<tr>\n");
    ctx.render_children(token)?;
    ctx.push_str("</tr>\n");
    Ok(())
}

fn render_cell(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let tag = if token.attr_flag("head") { "th" } else { "td" };
    ctx.push_str("<");
    ctx.push_str(tag);
    if let Some(align) = token.attr_str("align") {
        ctx.push_str(" align=\"");
        ctx.push_str(align);
        ctx.push_str("\"");
    }
    ctx.push_str(">");
    ctx.render_children(token)?;
    ctx.push_str("</");
    ctx.push_str(tag);
    ctx.push_str(">\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_rows() {
        assert_eq!(split_row("| a | b |"), ["a", "b"]);
        assert_eq!(split_row("a | b"), ["a", "b"]);
        assert_eq!(split_row("| f\\|oo |"), ["f|oo"]);
        assert_eq!(split_row("| a |  |"), ["a", ""]);
    }

    #[test]
    fn delimiter_alignment() {
        let aligns = parse_delimiter_row("| :-: | ---: | :-- | --- |").expect("valid");
        assert_eq!(aligns[0].as_deref(), Some("center"));
        assert_eq!(aligns[1].as_deref(), Some("right"));
        assert_eq!(aligns[2].as_deref(), Some("left"));
        assert_eq!(aligns[3], None);
    }

    #[test]
    fn rejects_bad_delimiter() {
        assert!(parse_delimiter_row("| a | b |").is_none());
        assert!(parse_delimiter_row("| :: |").is_none());
    }
}
