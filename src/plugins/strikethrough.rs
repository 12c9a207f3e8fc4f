//! GFM strikethrough.

use std::sync::Arc;

use crate::error::Error;
use crate::inline::{delimiter, InlineRule};
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::render::HtmlContext;
use crate::state::InlineState;
use crate::token::Token;

/// `~~text~~` rendered as `<del>`.
///
/// Tilde runs ride the shared delimiter processor; only runs of
/// exactly two match.
pub struct Strikethrough;

impl Plugin for Strikethrough {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn setup(&self, md: &mut Markdown) {
        md.inline_rule(Arc::new(TildeRule));
        md.render_method("strikethrough", Box::new(render_strikethrough));
    }
}

struct TildeRule;

impl InlineRule for TildeRule {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn triggers(&self) -> &'static [u8] {
        b"~"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        delimiter::emit_delimiter_run(state, true)
    }
}

fn render_strikethrough(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<del>");
    ctx.render_children(token)?;
    ctx.push_str("</del>");
    Ok(())
}
