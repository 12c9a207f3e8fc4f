//! HTML renderer.
//!
//! Dispatch is a registry from token kind to a render method, so
//! plugins can add methods for their own kinds at parser construction.
//! A kind with no method is a deterministic error naming the kind.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::escape::{self, escape_html_into};
use crate::scan::unescape;
use crate::state::Env;
use crate::token::Token;

/// A render method for one token kind.
pub type RenderFn = Box<dyn Fn(&mut HtmlContext<'_>, &Token) -> Result<(), Error> + Send + Sync>;

/// Output options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Escape raw HTML instead of passing it through.
    pub escape: bool,
    /// Render soft line breaks as `<br />`.
    pub hard_wrap: bool,
    /// Keep `javascript:` / `vbscript:` / `data:` destinations.
    pub allow_harmful_protocols: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape: true,
            hard_wrap: false,
            allow_harmful_protocols: false,
        }
    }
}

/// The HTML renderer: a method registry plus options.
pub struct HtmlRenderer {
    methods: FxHashMap<Cow<'static, str>, RenderFn>,
    options: RenderOptions,
}

impl HtmlRenderer {
    /// A renderer with methods for every core token kind.
    pub fn new(options: RenderOptions) -> Self {
        let mut renderer = Self {
            methods: FxHashMap::default(),
            options,
        };
        renderer.register("text", Box::new(text));
        renderer.register("codespan", Box::new(codespan));
        renderer.register("emphasis", Box::new(emphasis));
        renderer.register("strong", Box::new(strong));
        renderer.register("link", Box::new(link));
        renderer.register("image", Box::new(image));
        renderer.register("inline_html", Box::new(inline_html));
        renderer.register("linebreak", Box::new(linebreak));
        renderer.register("softbreak", Box::new(softbreak));
        renderer.register("paragraph", Box::new(paragraph));
        renderer.register("heading", Box::new(heading));
        renderer.register("thematic_break", Box::new(thematic_break));
        renderer.register("block_code", Box::new(block_code));
        renderer.register("block_quote", Box::new(block_quote));
        renderer.register("block_html", Box::new(block_html));
        renderer.register("block_error", Box::new(block_error));
        renderer.register("list", Box::new(list));
        renderer.register("list_item", Box::new(list_item));
        renderer
    }

    /// Register (or replace) the method for a token kind.
    pub fn register(&mut self, kind: impl Into<Cow<'static, str>>, method: RenderFn) {
        self.methods.insert(kind.into(), method);
    }

    /// Whether a method exists for `kind`.
    pub fn has_method(&self, kind: &str) -> bool {
        self.methods.contains_key(kind)
    }

    /// Output options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a token tree.
    pub fn render(&self, tokens: &[Token], env: &Env) -> Result<String, Error> {
        let mut ctx = HtmlContext {
            renderer: self,
            env,
            out: String::new(),
        };
        for token in tokens {
            ctx.render_token(token)?;
        }
        Ok(ctx.out)
    }
}

/// Mutable rendering context handed to each method.
pub struct HtmlContext<'a> {
    renderer: &'a HtmlRenderer,
    env: &'a Env,
    out: String,
}

impl HtmlContext<'_> {
    /// Dispatch one token to its registered method.
    pub fn render_token(&mut self, token: &Token) -> Result<(), Error> {
        let renderer = self.renderer;
        let method = renderer
            .methods
            .get(token.kind.as_ref())
            .ok_or_else(|| Error::RendererMissingMethod(token.kind.to_string()))?;
        method(self, token)
    }

    /// Render all children of `token` in order.
    pub fn render_children(&mut self, token: &Token) -> Result<(), Error> {
        if let Some(children) = &token.children {
            for child in children {
                self.render_token(child)?;
            }
        }
        Ok(())
    }

    /// Append raw output.
    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Append HTML-escaped text.
    pub fn push_escaped(&mut self, s: &str) {
        escape_html_into(&mut self.out, s);
    }

    /// Append a destination, substituting harmful protocols.
    pub fn push_url(&mut self, url: &str) {
        if !self.renderer.options.allow_harmful_protocols && escape::is_harmful_url(url) {
            self.out.push_str(escape::HARMFUL_LINK);
        } else {
            escape_html_into(&mut self.out, url);
        }
    }

    /// Output options.
    pub fn options(&self) -> &RenderOptions {
        &self.renderer.options
    }

    /// The document env.
    pub fn env(&self) -> &Env {
        self.env
    }

    /// Whether the output currently ends with a newline (or is empty).
    pub fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }
}

// --- inline methods ---

fn text(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    Ok(())
}

fn codespan(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<code>");
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("</code>");
    Ok(())
}

fn emphasis(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<em>");
    ctx.render_children(token)?;
    ctx.push_str("</em>");
    Ok(())
}

fn strong(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<strong>");
    ctx.render_children(token)?;
    ctx.push_str("</strong>");
    Ok(())
}

fn link(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<a href=\"");
    ctx.push_url(token.attr_str("url").unwrap_or(""));
    if let Some(title) = token.attr_str("title") {
        ctx.push_str("\" title=\"");
        ctx.push_escaped(title);
    }
    ctx.push_str("\">");
    ctx.render_children(token)?;
    ctx.push_str("</a>");
    Ok(())
}

fn image(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let mut alt = String::new();
    token.collect_text(&mut alt);
    ctx.push_str("<img src=\"");
    ctx.push_url(token.attr_str("url").unwrap_or(""));
    ctx.push_str("\" alt=\"");
    ctx.push_escaped(&alt);
    if let Some(title) = token.attr_str("title") {
        ctx.push_str("\" title=\"");
        ctx.push_escaped(title);
    }
    ctx.push_str("\" />");
    Ok(())
}

fn inline_html(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let raw = token.text.as_deref().unwrap_or("");
    if ctx.options().escape {
        ctx.push_escaped(raw);
    } else {
        ctx.push_str(raw);
    }
    Ok(())
}

fn linebreak(ctx: &mut HtmlContext<'_>, _token: &Token) -> Result<(), Error> {
    ctx.push_str("<br />\n");
    Ok(())
}

fn softbreak(ctx: &mut HtmlContext<'_>, _token: &Token) -> Result<(), Error> {
    if ctx.options().hard_wrap {
        ctx.push_str("<br />\n");
    } else {
        ctx.push_str("\n");
    }
    Ok(())
}

// --- block methods ---

fn paragraph(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<p>");
    ctx.render_children(token)?;
    ctx.push_str("</p>\n");
    Ok(())
}

fn heading(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let level = token.attr_int("level").unwrap_or(1).clamp(1, 6);
    ctx.push_str("<h");
    ctx.push_str(&level.to_string());
    if let Some(slug) = token.attr_str("slug") {
        ctx.push_str(" id=\"");
        ctx.push_escaped(slug);
        ctx.push_str("\"");
    }
    ctx.push_str(">");
    ctx.render_children(token)?;
    ctx.push_str("</h");
    ctx.push_str(&level.to_string());
    ctx.push_str(">\n");
    Ok(())
}

fn thematic_break(ctx: &mut HtmlContext<'_>, _token: &Token) -> Result<(), Error> {
    ctx.push_str("<hr />\n");
    Ok(())
}

fn block_code(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let lang = token
        .attr_str("info")
        .and_then(|info| info.split_whitespace().next())
        .map(|word| escape::decode_entities(&unescape(word)).into_owned());
    match lang {
        Some(lang) if !lang.is_empty() => {
            ctx.push_str("<pre><code class=\"language-");
            ctx.push_escaped(&lang);
            ctx.push_str("\">");
        }
        _ => ctx.push_str("<pre><code>"),
    }
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("</code></pre>\n");
    Ok(())
}

fn block_quote(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<blockquote>\n");
    ctx.render_children(token)?;
    ctx.push_str("</blockquote>\n");
    Ok(())
}

fn block_html(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let raw = token.text.as_deref().unwrap_or("");
    if ctx.options().escape {
        ctx.push_str("<p>");
        ctx.push_escaped(raw.trim_end());
        ctx.push_str("</p>\n");
    } else {
        ctx.push_str(raw);
    }
    Ok(())
}

fn block_error(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<div class=\"error\"><pre>");
    ctx.push_escaped(token.text.as_deref().unwrap_or(""));
    ctx.push_str("</pre></div>\n");
    Ok(())
}

fn list(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let ordered = token.attr_flag("ordered");
    if ordered {
        let start = token.attr_int("start").unwrap_or(1);
        if start != 1 {
            ctx.push_str("<ol start=\"");
            ctx.push_str(&start.to_string());
            ctx.push_str("\">\n");
        } else {
            ctx.push_str("<ol>\n");
        }
    } else {
        ctx.push_str("<ul>\n");
    }
    ctx.render_children(token)?;
    ctx.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
    Ok(())
}

fn list_item(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    ctx.push_str("<li>");
    if let Some(checked) = token.attr("checked").and_then(crate::token::AttrValue::as_bool) {
        if checked {
            ctx.push_str("<input type=\"checkbox\" disabled checked> ");
        } else {
            ctx.push_str("<input type=\"checkbox\" disabled> ");
        }
    }
    if token.attr_flag("tight") {
        if let Some(children) = &token.children {
            for child in children {
                if child.kind == "paragraph" {
                    ctx.render_children(child)?;
                } else {
                    if !ctx.at_line_start() {
                        ctx.push_str("\n");
                    }
                    ctx.render_token(child)?;
                }
            }
        }
    } else {
        ctx.push_str("\n");
        ctx.render_children(token)?;
    }
    ctx.push_str("</li>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token]) -> String {
        let env = Env::default();
        HtmlRenderer::new(RenderOptions::default())
            .render(tokens, &env)
            .expect("core methods registered")
    }

    #[test]
    fn missing_method_is_fatal() {
        let env = Env::default();
        let renderer = HtmlRenderer::new(RenderOptions::default());
        let err = renderer
            .render(&[Token::new("no_such_kind")], &env)
            .expect_err("must fail");
        assert!(matches!(err, Error::RendererMissingMethod(kind) if kind == "no_such_kind"));
    }

    #[test]
    fn paragraph_with_emphasis() {
        let tokens = vec![Token::container(
            "paragraph",
            vec![
                Token::text_leaf("text", "a "),
                Token::container("emphasis", vec![Token::text_leaf("text", "b")]),
            ],
        )];
        assert_eq!(render(&tokens), "<p>a <em>b</em></p>\n");
    }

    #[test]
    fn text_is_escaped() {
        let tokens = vec![Token::container(
            "paragraph",
            vec![Token::text_leaf("text", "<script>")],
        )];
        assert_eq!(render(&tokens), "<p>&lt;script&gt;</p>\n");
    }

    #[test]
    fn harmful_protocol_suppressed() {
        let token = Token::container("link", vec![Token::text_leaf("text", "x")])
            .with_attr("url", "javascript:alert(1)");
        assert_eq!(
            render(&[token]),
            "<a href=\"#harmful-link\">x</a>"
        );
    }

    #[test]
    fn image_alt_from_children() {
        let token = Token::container("image", vec![Token::text_leaf("text", "alt text")])
            .with_attr("url", "/i.png");
        assert_eq!(render(&[token]), "<img src=\"/i.png\" alt=\"alt text\" />");
    }

    #[test]
    fn ordered_list_start() {
        let item = Token::container(
            "list_item",
            vec![Token::container("paragraph", vec![Token::text_leaf("text", "a")])],
        )
        .with_attr("tight", true);
        let list_token = Token::container("list", vec![item])
            .with_attr("ordered", true)
            .with_attr("start", 3i64)
            .with_attr("tight", true);
        assert_eq!(
            render(&[list_token]),
            "<ol start=\"3\">\n<li>a</li>\n</ol>\n"
        );
    }

    #[test]
    fn loose_item_wraps_paragraphs() {
        let item = Token::container(
            "list_item",
            vec![Token::container("paragraph", vec![Token::text_leaf("text", "a")])],
        )
        .with_attr("tight", false);
        let list_token = Token::container("list", vec![item])
            .with_attr("ordered", false)
            .with_attr("tight", false);
        assert_eq!(
            render(&[list_token]),
            "<ul>\n<li>\n<p>a</p>\n</li>\n</ul>\n"
        );
    }
}
