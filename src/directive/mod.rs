//! The directive subsystem.
//!
//! One envelope parser feeds a handler registry. Two syntaxes produce
//! the same canonical record:
//!
//! ```text
//! .. name:: title
//!    :key: value
//!
//!    content
//! ```
//!
//! and the fenced form:
//!
//! ````text
//! ```{name} title
//! :key: value
//!
//! content
//! ```
//! ````
//!
//! An RST envelope naming an unregistered directive is a fatal
//! [`Error::DirectiveNotRegistered`]; an unknown fenced name declines
//! so the block falls through to ordinary fenced code.

mod admonition;
mod figure;
mod include;
mod toc;

pub use admonition::Admonition;
pub use figure::Figure;
pub use include::Include;
pub use toc::Toc;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::markdown::Markdown;
use crate::plugin::Plugin;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// A parsed directive envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive name as written.
    pub name: String,
    /// Argument text after the name (may be empty).
    pub title: String,
    /// `:key: value` option lines, in order.
    pub options: Vec<(String, String)>,
    /// Dedented body content.
    pub content: String,
}

impl Directive {
    /// Look up an option by key.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A directive handler: receives the canonical record and the block
/// state and produces the tokens to splice in.
pub trait DirectiveHandler: Send + Sync {
    /// Directive names this handler serves.
    fn names(&self) -> &'static [&'static str];

    /// Produce tokens for one directive occurrence.
    fn parse(
        &self,
        directive: Directive,
        parser: &BlockParser,
        state: &mut BlockState<'_>,
    ) -> Result<Vec<Token>, Error>;

    /// Extend the pipeline (render methods, passes). Runs once at
    /// parser construction.
    fn setup(&self, _md: &mut Markdown) {}
}

/// Which envelope syntaxes to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveSyntax {
    /// `.. name::` only.
    Rst,
    /// ```` ```{name} ```` only.
    Fenced,
    /// Both forms.
    Both,
}

type Registry = FxHashMap<&'static str, Arc<dyn DirectiveHandler>>;

/// The directives plugin: a syntax choice plus registered handlers.
pub struct Directives {
    syntax: DirectiveSyntax,
    handlers: Vec<Arc<dyn DirectiveHandler>>,
}

impl Directives {
    /// RST-style directives.
    pub fn rst() -> Self {
        Self {
            syntax: DirectiveSyntax::Rst,
            handlers: Vec::new(),
        }
    }

    /// Fenced directives.
    pub fn fenced() -> Self {
        Self {
            syntax: DirectiveSyntax::Fenced,
            handlers: Vec::new(),
        }
    }

    /// Both envelope forms.
    pub fn both() -> Self {
        Self {
            syntax: DirectiveSyntax::Both,
            handlers: Vec::new(),
        }
    }

    /// Add a handler.
    pub fn with(mut self, handler: impl DirectiveHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }
}

impl Plugin for Directives {
    fn name(&self) -> &'static str {
        "directives"
    }

    fn setup(&self, md: &mut Markdown) {
        let mut registry: Registry = FxHashMap::default();
        for handler in &self.handlers {
            for name in handler.names() {
                registry.insert(name, Arc::clone(handler));
            }
        }
        let registry = Arc::new(registry);

        if matches!(self.syntax, DirectiveSyntax::Rst | DirectiveSyntax::Both) {
            md.block_rule(Arc::new(RstRule {
                registry: Arc::clone(&registry),
            }));
        }
        if matches!(self.syntax, DirectiveSyntax::Fenced | DirectiveSyntax::Both) {
            md.block_rule(Arc::new(FencedRule {
                registry: Arc::clone(&registry),
            }));
        }
        for handler in &self.handlers {
            handler.setup(md);
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Split leading `:key: value` lines from a dedented body.
fn split_options(lines: &[String]) -> (Vec<(String, String)>, usize) {
    let mut options = Vec::new();
    let mut consumed = 0;
    for line in lines {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            break;
        };
        let Some(colon) = rest.find(':') else {
            break;
        };
        let key = &rest[..colon];
        if !valid_name(key) {
            break;
        }
        options.push((key.to_owned(), rest[colon + 1..].trim().to_owned()));
        consumed += 1;
    }
    (options, consumed)
}

fn dispatch(
    registry: &Registry,
    directive: Directive,
    parser: &BlockParser,
    state: &mut BlockState<'_>,
) -> Result<(), Error> {
    let name = directive.name.clone();
    let Some(handler) = registry.get(name.as_str()) else {
        return Err(Error::DirectiveNotRegistered(name));
    };
    debug!(directive = %name, "dispatching directive");
    let tokens = handler.parse(directive, parser, state)?;
    for token in tokens {
        state.append(token);
    }
    Ok(())
}

/// `.. name:: title` with indented options and content.
struct RstRule {
    registry: Arc<Registry>,
}

impl BlockRule for RstRule {
    fn name(&self) -> &'static str {
        "rst_directive"
    }

    fn priority(&self) -> u8 {
        110
    }

    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let (name, title, body_indent) = {
            let line = state.line();
            if scan::indent_width(line) > 3 {
                return Ok(false);
            }
            let trimmed = line.trim_start_matches([' ', '\t']);
            let Some(rest) = trimmed.strip_prefix("..") else {
                return Ok(false);
            };
            let after_dots = rest.len();
            let rest = rest.trim_start_matches(' ');
            if rest.len() == after_dots {
                return Ok(false);
            }
            let marker_spaces = after_dots - rest.len();
            let Some(colons) = rest.find("::") else {
                return Ok(false);
            };
            let name = &rest[..colons];
            if !valid_name(name) {
                return Ok(false);
            }
            let title = rest[colons + 2..].trim().to_owned();
            (name.to_owned(), title, 2 + marker_spaces)
        };
        state.advance_line();

        let mut lines: Vec<String> = Vec::new();
        let mut blanks = 0usize;
        while !state.eof() {
            let line = state.line();
            if scan::is_blank(line) {
                blanks += 1;
                state.advance_line();
                continue;
            }
            if scan::indent_width(line) < body_indent {
                break;
            }
            for _ in 0..blanks {
                lines.push(String::new());
            }
            blanks = 0;
            lines.push(scan::strip_columns(line, body_indent).into_owned());
            state.advance_line();
        }

        let (options, consumed) = split_options(&lines);
        let mut content_lines = &lines[consumed..];
        while content_lines.first().is_some_and(|l| l.trim().is_empty()) {
            content_lines = &content_lines[1..];
        }
        let directive = Directive {
            name,
            title,
            options,
            content: content_lines.join("\n"),
        };
        dispatch(&self.registry, directive, parser, state)?;
        Ok(true)
    }
}

/// ```` ```{name} title ```` fenced directives.
struct FencedRule {
    registry: Arc<Registry>,
}

impl BlockRule for FencedRule {
    fn name(&self) -> &'static str {
        "fenced_directive"
    }

    fn priority(&self) -> u8 {
        5
    }

    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let (name, title, marker, fence_len, indent) = {
            let line = state.line();
            let indent = scan::indent_width(line);
            if indent > 3 {
                return Ok(false);
            }
            let trimmed = line.trim_start_matches([' ', '\t']);
            let bytes = trimmed.as_bytes();
            let marker = match bytes.first().copied() {
                Some(b @ (b'`' | b'~')) => b,
                _ => return Ok(false),
            };
            let mut fence_len = 0;
            while fence_len < bytes.len() && bytes[fence_len] == marker {
                fence_len += 1;
            }
            if fence_len < 3 {
                return Ok(false);
            }
            let info = trimmed[fence_len..].trim();
            let Some(rest) = info.strip_prefix('{') else {
                return Ok(false);
            };
            let Some(close) = rest.find('}') else {
                return Ok(false);
            };
            let name = &rest[..close];
            if !valid_name(name) || !self.registry.contains_key(name) {
                return Ok(false);
            }
            let title = rest[close + 1..].trim().to_owned();
            (name.to_owned(), title, marker, fence_len, indent)
        };
        state.advance_line();

        let mut lines: Vec<String> = Vec::new();
        while !state.eof() {
            let line = state.line();
            if closes_fence(line, marker, fence_len) {
                state.advance_line();
                break;
            }
            lines.push(scan::strip_columns(line, indent).into_owned());
            state.advance_line();
        }

        let (options, consumed) = split_options(&lines);
        let mut content_lines = &lines[consumed..];
        while content_lines.first().is_some_and(|l| l.trim().is_empty()) {
            content_lines = &content_lines[1..];
        }
        let directive = Directive {
            name,
            title,
            options,
            content: content_lines.join("\n"),
        };
        dispatch(&self.registry, directive, parser, state)?;
        Ok(true)
    }
}

fn closes_fence(line: &str, marker: u8, open_len: usize) -> bool {
    if scan::indent_width(line) > 3 {
        return false;
    }
    let trimmed = line.trim_start_matches([' ', '\t']);
    let bytes = trimmed.as_bytes();
    let mut len = 0;
    while len < bytes.len() && bytes[len] == marker {
        len += 1;
    }
    len >= open_len && trimmed[len..].trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_splitting() {
        let lines = vec![
            ":class: wide".to_owned(),
            ":max-level: 2".to_owned(),
            "".to_owned(),
            "body".to_owned(),
        ];
        let (options, consumed) = split_options(&lines);
        assert_eq!(consumed, 2);
        assert_eq!(options[0], ("class".to_owned(), "wide".to_owned()));
        assert_eq!(options[1], ("max-level".to_owned(), "2".to_owned()));
    }

    #[test]
    fn unknown_rst_directive_is_fatal() {
        let md = Markdown::new().plugin(Directives::rst());
        let err = md.convert(".. mystery:: arg\n").expect_err("must fail");
        assert!(matches!(err, Error::DirectiveNotRegistered(name) if name == "mystery"));
    }

    #[test]
    fn unknown_fenced_name_falls_through_to_code() {
        let md = Markdown::new().plugin(Directives::fenced());
        let html = md.convert("```{mystery}\nx\n```").expect("convert");
        assert!(html.contains("<pre><code"));
    }

    #[test]
    fn directive_names_validate() {
        assert!(valid_name("note"));
        assert!(valid_name("max-level"));
        assert!(!valid_name(""));
        assert!(!valid_name("has space"));
    }
}
