//! Admonition directives.

use crate::block::BlockParser;
use crate::directive::{Directive, DirectiveHandler};
use crate::error::Error;
use crate::markdown::Markdown;
use crate::render::HtmlContext;
use crate::state::BlockState;
use crate::token::Token;

/// The standard admonition family.
pub struct Admonition;

const NAMES: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

impl DirectiveHandler for Admonition {
    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn parse(
        &self,
        directive: Directive,
        parser: &BlockParser,
        state: &mut BlockState<'_>,
    ) -> Result<Vec<Token>, Error> {
        let children = parser.parse_child(state, directive.content)?;
        let mut token = Token::container("admonition", children).with_attr("name", directive.name);
        if !directive.title.is_empty() {
            token.set_attr("title", directive.title);
        }
        Ok(vec![token])
    }

    fn setup(&self, md: &mut Markdown) {
        md.render_method("admonition", Box::new(render_admonition));
    }
}

fn render_admonition(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<section class=\"admonition ");
    ctx.push_escaped(token.attr_str("name").unwrap_or("note"));
    ctx.push_str("\">\n");
    if let Some(title) = token.attr_str("title") {
        ctx.push_str("<p class=\"admonition-title\">");
        ctx.push_escaped(title);
        ctx.push_str("</p>\n");
    }
    ctx.render_children(token)?;
    ctx.push_str("</section>\n");
    Ok(())
}
