//! Abbreviations.
//!
//! `*[KEY]: expansion` definitions, applied to whole-word occurrences
//! in text tokens after the inline phase.

use std::sync::Arc;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::markdown::{Markdown, PassContext, PassStage};
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::scan;
use crate::state::{BlockState, Env};
use crate::token::Token;

/// Abbreviation definitions and substitution.
pub struct Abbreviations;

impl Plugin for Abbreviations {
    fn name(&self) -> &'static str {
        "abbreviations"
    }

    fn setup(&self, md: &mut Markdown) {
        md.block_rule(Arc::new(AbbrDef));
        md.tree_pass("abbreviations", PassStage::AfterInline, Box::new(substitute));
        md.render_method("abbr", Box::new(render_abbr));
    }
}

struct AbbrDef;

impl BlockRule for AbbrDef {
    fn name(&self) -> &'static str {
        "abbr_def"
    }

    fn priority(&self) -> u8 {
        72
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let (key, expansion) = {
            let line = state.line();
            if state.has_open_paragraph() || scan::indent_width(line) > 3 {
                return Ok(false);
            }
            let trimmed = line.trim_start_matches([' ', '\t']);
            let Some(rest) = trimmed.strip_prefix("*[") else {
                return Ok(false);
            };
            let Some(close) = rest.find("]:") else {
                return Ok(false);
            };
            let key = rest[..close].trim();
            if key.is_empty() {
                return Ok(false);
            }
            (key.to_owned(), rest[close + 2..].trim().to_owned())
        };
        state.advance_line();
        state.env.abbreviations.entry(key).or_insert(expansion);
        Ok(true)
    }
}

fn substitute(
    _ctx: &PassContext<'_>,
    tokens: &mut Vec<Token>,
    env: &mut Env,
) -> Result<(), Error> {
    if env.abbreviations.is_empty() {
        return Ok(());
    }
    let mut keys: Vec<(String, String)> = env
        .abbreviations
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    // Longest first so overlapping keys prefer the longer match.
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
    replace_in(tokens, &keys);
    Ok(())
}

fn replace_in(tokens: &mut Vec<Token>, keys: &[(String, String)]) {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for mut token in tokens.drain(..) {
        if let Some(children) = token.children.as_mut() {
            replace_in(children, keys);
        }
        if token.kind == "text" {
            let text = token.text.take().unwrap_or_default();
            split_text(&text, keys, &mut out);
        } else {
            out.push(token);
        }
    }
    *tokens = out;
}

fn split_text(text: &str, keys: &[(String, String)], out: &mut Vec<Token>) {
    let mut rest = text;
    'outer: while !rest.is_empty() {
        let mut best: Option<(usize, &str, &str)> = None;
        for (key, title) in keys {
            if let Some(at) = find_word(rest, key.as_str()) {
                if best.map_or(true, |(b, _, _)| at < b) {
                    best = Some((at, key.as_str(), title.as_str()));
                }
            }
        }
        let Some((at, key, title)) = best else {
            out.push(Token::text_leaf("text", rest));
            break 'outer;
        };
        if at > 0 {
            out.push(Token::text_leaf("text", &rest[..at]));
        }
        out.push(Token::text_leaf("abbr", key).with_attr("title", title));
        rest = &rest[at + key.len()..];
    }
}

/// Find `key` in `text` at a word boundary.
fn find_word(text: &str, key: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = text[from..].find(key) {
        let at = from + found;
        let before_ok = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[at + key.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return Some(at);
        }
        from = at + key.len();
    }
    None
}

fn render_abbr(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<abbr title=\"");
    ctx.push_escaped(token.attr_str("title").unwrap_or(""));
    ctx.push_str("\">");
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("</abbr>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_html(src: &str) -> String {
        Markdown::new()
            .plugin(Abbreviations)
            .convert(src)
            .expect("convert")
    }

    #[test]
    fn substitutes_whole_words() {
        let html = to_html("The HTML spec.\n\n*[HTML]: Hyper Text Markup Language");
        assert!(html.contains("<abbr title=\"Hyper Text Markup Language\">HTML</abbr>"));
    }

    #[test]
    fn no_partial_word_match() {
        let html = to_html("XHTML5 here.\n\n*[HTML]: Hyper Text Markup Language");
        assert!(!html.contains("<abbr"));
    }

    #[test]
    fn first_definition_wins() {
        let html = to_html("HTML\n\n*[HTML]: first\n*[HTML]: second");
        assert!(html.contains("title=\"first\""));
    }

    #[test]
    fn code_spans_untouched() {
        let html = to_html("`HTML`\n\n*[HTML]: markup");
        assert!(!html.contains("<abbr"));
    }
}
