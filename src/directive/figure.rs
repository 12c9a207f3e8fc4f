//! Image/figure directive.

use crate::block::BlockParser;
use crate::directive::{Directive, DirectiveHandler};
use crate::error::Error;
use crate::escape::encode_url;
use crate::markdown::Markdown;
use crate::render::HtmlContext;
use crate::state::BlockState;
use crate::token::Token;

/// `.. image:: url` / `.. figure:: url` with alt/width/height options
/// and an optional caption body.
pub struct Figure;

impl DirectiveHandler for Figure {
    fn names(&self) -> &'static [&'static str] {
        &["image", "figure"]
    }

    fn parse(
        &self,
        directive: Directive,
        parser: &BlockParser,
        state: &mut BlockState<'_>,
    ) -> Result<Vec<Token>, Error> {
        let url = directive.title.trim();
        if url.is_empty() {
            return Ok(vec![Token::text_leaf(
                "block_error",
                format!("{} directive requires a URL", directive.name),
            )]);
        }
        let mut token = Token::new("figure").with_attr("url", encode_url(url));
        for key in ["alt", "width", "height"] {
            if let Some(value) = directive.option(key) {
                let value = value.to_owned();
                match key {
                    "alt" => token.set_attr("alt", value),
                    "width" => token.set_attr("width", value),
                    _ => token.set_attr("height", value),
                }
            }
        }
        if !directive.content.trim().is_empty() {
            let caption = parser.parse_child(state, directive.content)?;
            token.children = Some(caption);
        }
        Ok(vec![token])
    }

    fn setup(&self, md: &mut Markdown) {
        md.render_method("figure", Box::new(render_figure));
    }
}

fn render_figure(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<figure>\n<img src=\"");
    ctx.push_url(token.attr_str("url").unwrap_or(""));
    ctx.push_str("\" alt=\"");
    ctx.push_escaped(token.attr_str("alt").unwrap_or(""));
    ctx.push_str("\"");
    if let Some(width) = token.attr_str("width") {
        ctx.push_str(" width=\"");
        ctx.push_escaped(width);
        ctx.push_str("\"");
    }
    if let Some(height) = token.attr_str("height") {
        ctx.push_str(" height=\"");
        ctx.push_escaped(height);
        ctx.push_str("\"");
    }
    ctx.push_str(" />\n");
    if token.children.is_some() {
        ctx.push_str("<figcaption>\n");
        ctx.render_children(token)?;
        ctx.push_str("</figcaption>\n");
    }
    ctx.push_str("</figure>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::directive::{Directives, Figure};
    use crate::markdown::Markdown;

    fn md() -> Markdown {
        Markdown::new().plugin(Directives::rst().with(Figure))
    }

    #[test]
    fn image_with_options() {
        let html = md()
            .convert(".. image:: /pic.png\n   :alt: A picture\n   :width: 640")
            .expect("convert");
        assert!(html.contains("<img src=\"/pic.png\" alt=\"A picture\" width=\"640\" />"));
    }

    #[test]
    fn figure_with_caption() {
        let html = md()
            .convert(".. figure:: /pic.png\n\n   The *caption*.")
            .expect("convert");
        assert!(html.contains("<figcaption>"));
        assert!(html.contains("<em>caption</em>"));
    }

    #[test]
    fn missing_url_is_an_error_block() {
        let html = md().convert(".. image::").expect("convert");
        assert!(html.contains("<div class=\"error\">"));
    }
}
