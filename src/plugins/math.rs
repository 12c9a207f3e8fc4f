//! Math blocks and spans.

use std::sync::Arc;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::inline::InlineRule;
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::scan;
use crate::state::{BlockState, InlineState};
use crate::token::Token;

/// `$$ ... $$` block math and `$...$` inline math.
pub struct Math;

impl Plugin for Math {
    fn name(&self) -> &'static str {
        "math"
    }

    fn setup(&self, md: &mut Markdown) {
        md.block_rule(Arc::new(MathBlock));
        md.inline_rule(Arc::new(MathInline));
        md.render_method("block_math", Box::new(render_block));
        md.render_method("inline_math", Box::new(render_inline));
    }
}

struct MathBlock;

impl BlockRule for MathBlock {
    fn name(&self) -> &'static str {
        "math_block"
    }

    fn priority(&self) -> u8 {
        15
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let single = {
            let line = state.line();
            if scan::indent_width(line) > 3 {
                return Ok(false);
            }
            let trimmed = line.trim();
            if !trimmed.starts_with("$$") {
                return Ok(false);
            }
            if trimmed.len() > 4 && trimmed.ends_with("$$") {
                Some(trimmed[2..trimmed.len() - 2].trim().to_owned())
            } else if trimmed == "$$" {
                None
            } else {
                return Ok(false);
            }
        };
        state.advance_line();

        let content = match single {
            Some(content) => content,
            None => {
                let mut lines = Vec::new();
                while !state.eof() {
                    let line = state.line();
                    if line.trim() == "$$" {
                        state.advance_line();
                        break;
                    }
                    lines.push(line.to_owned());
                    state.advance_line();
                }
                lines.join("\n")
            }
        };
        state.append(Token::text_leaf("block_math", content));
        Ok(true)
    }
}

struct MathInline;

impl InlineRule for MathInline {
    fn name(&self) -> &'static str {
        "math_inline"
    }

    fn priority(&self) -> u8 {
        45
    }

    fn triggers(&self) -> &'static [u8] {
        b"$"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let bytes = state.src.as_bytes();
        let pos = state.pos;
        if bytes.get(pos + 1) == Some(&b'$') {
            return None;
        }
        // Opening $ must touch content.
        if matches!(bytes.get(pos + 1).copied(), None | Some(b' ') | Some(b'\n')) {
            return None;
        }
        let mut at = pos + 1;
        while at < bytes.len() {
            match bytes[at] {
                b'$' => {
                    if matches!(bytes[at - 1], b' ' | b'\n') {
                        return None;
                    }
                    let content = state.src[pos + 1..at].to_owned();
                    state.append(Token::text_leaf("inline_math", content));
                    return Some(at + 1);
                }
                b'\n' => return None,
                _ => at += 1,
            }
        }
        None
    }
}

fn render_block(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<div class=\"math\">$$\n");
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("\n$$</div>\n");
    Ok(())
}

fn render_inline(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<span class=\"math\">\\(");
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("\\)</span>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_html(src: &str) -> String {
        Markdown::new().plugin(Math).convert(src).expect("convert")
    }

    #[test]
    fn block_math_multi_line() {
        let html = to_html("$$\nx^2 + y^2\n$$");
        assert_eq!(html, "<div class=\"math\">$$\nx^2 + y^2\n$$</div>\n");
    }

    #[test]
    fn block_math_single_line() {
        let html = to_html("$$e=mc^2$$");
        assert!(html.contains("e=mc^2"));
    }

    #[test]
    fn inline_math() {
        let html = to_html("Euler: $e^{i\\pi}=-1$.");
        assert!(html.contains("<span class=\"math\">\\(e^{i\\pi}=-1\\)</span>"));
    }

    #[test]
    fn dollar_amounts_stay_literal() {
        let html = to_html("$5 and $10");
        assert!(!html.contains("class=\"math\""));
    }
}
