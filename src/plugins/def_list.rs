//! Definition lists.
//!
//! ```text
//! term
//! : definition
//! ```

use std::sync::Arc;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// Term lines followed by `: definition` lines.
pub struct DefList;

impl Plugin for DefList {
    fn name(&self) -> &'static str {
        "def_list"
    }

    fn setup(&self, md: &mut Markdown) {
        md.block_rule(Arc::new(DefListRule));
        md.inline_leaf("def_term");
        md.render_method("def_list", Box::new(render_list));
        md.render_method("def_term", Box::new(render_term));
        md.render_method("def_desc", Box::new(render_desc));
    }
}

struct DefListRule;

fn is_def_line(line: &str) -> bool {
    let trimmed = line.trim_start_matches([' ', '\t']);
    trimmed.starts_with(": ") || trimmed == ":"
}

impl BlockRule for DefListRule {
    fn name(&self) -> &'static str {
        "def_list"
    }

    fn priority(&self) -> u8 {
        105
    }

    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        {
            let line = state.line();
            if state.has_open_paragraph()
                || scan::indent_width(line) > 3
                || is_def_line(line)
                || scan::is_blank(line)
            {
                return Ok(false);
            }
            match state.peek_line(1) {
                Some(next) if is_def_line(next) => {}
                _ => return Ok(false),
            }
        }

        let mut children: Vec<Token> = Vec::new();
        loop {
            let term = state.take_line().trim().to_owned();
            children.push(Token::text_leaf("def_term", term));

            while !state.eof() && is_def_line(state.line()) {
                let first = {
                    let trimmed = state.line().trim_start_matches([' ', '\t']);
                    trimmed.strip_prefix(": ").unwrap_or("").to_owned()
                };
                state.advance_line();

                let mut lines = vec![first];
                while !state.eof() {
                    let line = state.line();
                    if scan::is_blank(line) || scan::indent_width(line) < 2 {
                        break;
                    }
                    lines.push(scan::strip_columns(line, 2).into_owned());
                    state.advance_line();
                }
                let body = parser.parse_child(state, lines.join("\n"))?;
                children.push(Token::container("def_desc", body));
            }

            // Another term/definition pair may follow directly.
            let next_is_term = !state.eof()
                && !scan::is_blank(state.line())
                && !is_def_line(state.line())
                && state.peek_line(1).is_some_and(is_def_line);
            if !next_is_term {
                break;
            }
        }

        state.append(Token::container("def_list", children));
        Ok(true)
    }
}

fn render_list(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<dl>\n");
    ctx.render_children(token)?;
    ctx.push_str("</dl>\n");
    Ok(())
}

fn render_term(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<dt>");
    ctx.render_children(token)?;
    ctx.push_str("</dt>\n");
    Ok(())
}

fn render_desc(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<dd>");
    // A lone paragraph renders unwrapped, list-item style.
    match token.children.as_deref() {
        Some([only]) if only.kind == "paragraph" => ctx.render_children(only)?,
        _ => {
            ctx.push_str("\n");
            ctx.render_children(token)?;
        }
    }
    ctx.push_str("</dd>\n");
    Ok(())
}
