//! Table-of-contents directive.
//!
//! The handler emits a placeholder token. After the inline walk, a
//! tree pass collects every heading (assigning deduplicated slugs and
//! `id` attributes) and stores the filtered entries on each
//! placeholder for the renderer to expand into a nested list.

use crate::block::BlockParser;
use crate::directive::{Directive, DirectiveHandler};
use crate::error::Error;
use crate::markdown::{Markdown, PassContext, PassStage};
use crate::render::HtmlContext;
use crate::state::{BlockState, Env, HeadingEntry};
use crate::token::{AttrValue, Token};

/// `.. toc::` / ```` ```{toc} ````.
pub struct Toc;

const DEFAULT_MAX_LEVEL: i64 = 3;

impl DirectiveHandler for Toc {
    fn names(&self) -> &'static [&'static str] {
        &["toc"]
    }

    fn parse(
        &self,
        directive: Directive,
        _parser: &BlockParser,
        _state: &mut BlockState<'_>,
    ) -> Result<Vec<Token>, Error> {
        let max_level = directive
            .option("max-level")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_MAX_LEVEL)
            .clamp(1, 6);
        Ok(vec![Token::new("toc").with_attr("max_level", max_level)])
    }

    fn setup(&self, md: &mut Markdown) {
        md.tree_pass("toc", PassStage::AfterInline, Box::new(resolve_toc));
        md.render_method("toc", Box::new(render_toc));
    }
}

fn resolve_toc(
    _ctx: &PassContext<'_>,
    tokens: &mut Vec<Token>,
    env: &mut Env,
) -> Result<(), Error> {
    let mut taken: Vec<String> = Vec::new();
    collect_headings(tokens, env, &mut taken);

    for token in tokens.iter_mut() {
        fill_placeholders(token, &env.headings);
    }
    Ok(())
}

fn collect_headings(tokens: &mut [Token], env: &mut Env, taken: &mut Vec<String>) {
    for token in tokens.iter_mut() {
        if token.kind == "heading" {
            let mut text = String::new();
            token.collect_text(&mut text);
            let slug = unique_slug(&text, taken);
            token.set_attr("slug", slug.clone());
            let level = token.attr_int("level").unwrap_or(1).clamp(1, 6) as u8;
            env.headings.push(HeadingEntry { level, text, slug });
        }
        if let Some(children) = token.children.as_mut() {
            collect_headings(children, env, taken);
        }
    }
}

fn fill_placeholders(token: &mut Token, headings: &[HeadingEntry]) {
    if token.kind == "toc" {
        let max_level = token.attr_int("max_level").unwrap_or(DEFAULT_MAX_LEVEL);
        let entries: Vec<AttrValue> = headings
            .iter()
            .filter(|h| i64::from(h.level) <= max_level)
            .map(|h| {
                AttrValue::List(vec![
                    AttrValue::Int(i64::from(h.level)),
                    AttrValue::Str(h.slug.clone()),
                    AttrValue::Str(h.text.clone()),
                ])
            })
            .collect();
        token.set_attr("entries", AttrValue::List(entries));
        return;
    }
    if let Some(children) = token.children.as_mut() {
        for child in children {
            fill_placeholders(child, headings);
        }
    }
}

/// Slug for a heading: lowercase, alphanumerics kept, separators `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut dash_pending = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if dash_pending && !slug.is_empty() {
                slug.push('-');
            }
            dash_pending = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            dash_pending = true;
        }
    }
    if slug.is_empty() {
        "section".to_owned()
    } else {
        slug
    }
}

fn unique_slug(text: &str, taken: &mut Vec<String>) -> String {
    let base = slugify(text);
    let mut candidate = base.clone();
    let mut counter = 1;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    taken.push(candidate.clone());
    candidate
}

fn render_toc(ctx: &mut HtmlContext<'_>, token: &Token) -> Result<(), Error> {
    let entries = token
        .attr("entries")
        .and_then(AttrValue::as_list)
        .unwrap_or(&[]);
    if entries.is_empty() {
        ctx.push_str("<ul class=\"toc\"></ul>\n");
        return Ok(());
    }

    ctx.push_str("<ul class=\"toc\">\n");
    let mut depth = 0usize;
    let mut base_level: Option<i64> = None;
    for entry in entries {
        let items = match entry.as_list() {
            Some(items) if items.len() == 3 => items,
            _ => continue,
        };
        let level = items[0].as_int().unwrap_or(1);
        let slug = items[1].as_str().unwrap_or("").to_owned();
        let text = items[2].as_str().unwrap_or("").to_owned();

        let base = *base_level.get_or_insert(level);
        let want = (level - base).max(0) as usize;
        while depth < want {
            ctx.push_str("<ul>\n");
            depth += 1;
        }
        while depth > want {
            ctx.push_str("</ul>\n");
            depth -= 1;
        }
        ctx.push_str("<li><a href=\"#");
        ctx.push_escaped(&slug);
        ctx.push_str("\">");
        ctx.push_escaped(&text);
        ctx.push_str("</a></li>\n");
    }
    while depth > 0 {
        ctx.push_str("</ul>\n");
        depth -= 1;
    }
    ctx.push_str("</ul>\n");
    Ok(())
}
