//! Footnotes.
//!
//! `[^label]:` definitions are captured into the env during the block
//! phase (no token emitted). `[^label]` references are numbered by
//! first use. After the inline walk, used definitions are block-parsed
//! and appended as a trailing `footnotes` section with back-references.

use std::sync::Arc;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::inline::InlineRule;
use crate::markdown::{Markdown, PassContext, PassStage};
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::scan;
use crate::state::{BlockState, Env, InlineState};
use crate::token::Token;

/// Footnote definitions, references, and the trailing section.
pub struct Footnotes;

impl Plugin for Footnotes {
    fn name(&self) -> &'static str {
        "footnotes"
    }

    fn setup(&self, md: &mut Markdown) {
        md.block_rule(Arc::new(FootnoteDef));
        md.inline_rule(Arc::new(FootnoteRef));
        md.tree_pass("footnotes", PassStage::AfterInline, Box::new(collect_footnotes));
        md.render_method("footnote_ref", Box::new(render_ref));
        md.render_method("footnotes", Box::new(render_section));
        md.render_method("footnote_item", Box::new(render_item));
        md.render_method("footnote_backref", Box::new(render_backref));
    }
}

/// Labels are restricted to `[a-zA-Z0-9_-]`.
fn valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

struct FootnoteDef;

impl BlockRule for FootnoteDef {
    fn name(&self) -> &'static str {
        "footnote_def"
    }

    fn priority(&self) -> u8 {
        65
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let (label, first_line) = {
            let line = state.line();
            if state.has_open_paragraph() || scan::indent_width(line) > 3 {
                return Ok(false);
            }
            let trimmed = line.trim_start_matches([' ', '\t']);
            let Some(rest) = trimmed.strip_prefix("[^") else {
                return Ok(false);
            };
            let Some(close) = rest.find(']') else {
                return Ok(false);
            };
            let label = &rest[..close];
            if !valid_label(label) || !rest[close + 1..].starts_with(':') {
                return Ok(false);
            }
            (label.to_owned(), rest[close + 2..].trim_start().to_owned())
        };
        state.advance_line();

        let mut lines = vec![first_line];
        let mut blanks = 0usize;
        while !state.eof() {
            let line = state.line();
            if scan::is_blank(line) {
                blanks += 1;
                state.advance_line();
                continue;
            }
            if scan::indent_width(line) < 4 {
                break;
            }
            for _ in 0..blanks {
                lines.push(String::new());
            }
            blanks = 0;
            lines.push(scan::strip_columns(line, 4).into_owned());
            state.advance_line();
        }

        state.env.footnotes.define(&label, lines.join("\n"));
        Ok(true)
    }
}

struct FootnoteRef;

impl InlineRule for FootnoteRef {
    fn name(&self) -> &'static str {
        "footnote_ref"
    }

    fn priority(&self) -> u8 {
        35
    }

    fn triggers(&self) -> &'static [u8] {
        b"["
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let (label, end) = {
            let rest = state.src.get(state.pos..)?;
            let rest = rest.strip_prefix("[^")?;
            let close = rest.find(']')?;
            let label = &rest[..close];
            if !valid_label(label) {
                return None;
            }
            (label.to_owned(), state.pos + 2 + close + 1)
        };
        let index = state.env.footnotes.ref_index(&label)? as i64;
        let token = Token::new("footnote_ref")
            .with_attr("label", label)
            .with_attr("index", index);
        state.append(token);
        Some(end)
    }
}

fn collect_footnotes(
    ctx: &PassContext<'_>,
    tokens: &mut Vec<Token>,
    env: &mut Env,
) -> Result<(), Error> {
    if env.footnotes.ordered_labels().is_empty() {
        return Ok(());
    }

    let mut items: Vec<Token> = Vec::new();
    let mut built = 0usize;
    // Inline-parsing a body may reference further notes, extending the
    // order; keep going until it stabilizes.
    while built < env.footnotes.ordered_labels().len() {
        let label = env.footnotes.ordered_labels()[built].clone();
        let content = env.footnotes.content(&label).unwrap_or("").to_owned();
        let mut children = ctx.parse_blocks(&content, env)?;
        ctx.inline_walk(&mut children, env);

        let index = (built + 1) as i64;
        let backref = Token::new("footnote_backref").with_attr("index", index);
        match children.last_mut() {
            Some(last) if last.kind == "paragraph" => last.push_child(backref),
            _ => children.push(backref),
        }
        items.push(
            Token::container("footnote_item", children)
                .with_attr("label", label)
                .with_attr("index", index),
        );
        built += 1;
    }

    tokens.push(Token::container("footnotes", items));
    Ok(())
}

// --- renderer methods ---

fn render_ref(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let index = token.attr_int("index").unwrap_or(0).to_string();
    ctx.push_str("<sup class=\"footnote-ref\"><a href=\"#fn-");
    ctx.push_str(&index);
    ctx.push_str("\" id=\"fnref-");
    ctx.push_str(&index);
    ctx.push_str("\">");
    ctx.push_str(&index);
    ctx.push_str("</a></sup>");
    Ok(())
}

fn render_section(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<section class=\"footnotes\">\n<ol>\n");
    ctx.render_children(token)?;
    ctx.push_str("</ol>\n</section>\n");
    Ok(())
}

fn render_item(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let index = token.attr_int("index").unwrap_or(0).to_string();
    ctx.push_str("<li id=\"fn-");
    ctx.push_str(&index);
    ctx.push_str("\">");
    ctx.render_children(token)?;
    ctx.push_str("</li>\n");
    Ok(())
}

fn render_backref(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let index = token.attr_int("index").unwrap_or(0).to_string();
    ctx.push_str(" <a href=\"#fnref-");
    ctx.push_str(&index);
    ctx.push_str("\" class=\"footnote-backref\">\u{21a9}</a>");
    Ok(())
}
