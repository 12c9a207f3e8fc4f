//! Block phase: a prioritized rule registry over line-anchored matchers.
//!
//! The driver walks the source line by line. At each non-blank line it
//! tries the registered rules in priority order; the first rule that
//! consumes input wins. Unmatched lines coalesce into paragraphs.

mod fence;
mod heading;
mod html_block;
mod indented;
mod list;
mod quote;
mod ref_def;
mod thematic;

pub use fence::FencedCode;
pub use heading::{AtxHeading, SetextHeading};
pub use html_block::HtmlBlock;
pub use indented::IndentedCode;
pub use list::List;
pub use quote::BlockQuote;
pub use ref_def::RefDef;
pub use thematic::ThematicBreak;

use std::sync::Arc;

use crate::error::Error;
use crate::scan;
use crate::state::BlockState;

/// A block-level rule.
///
/// `apply` inspects the state at the current line and, on a match,
/// emits tokens, advances the cursor past everything it consumed, and
/// returns `Ok(true)`. `Ok(false)` passes control to the next rule.
pub trait BlockRule: Send + Sync {
    /// Unique rule name; re-registering a name replaces the rule.
    fn name(&self) -> &'static str;

    /// Priority; lower runs earlier.
    fn priority(&self) -> u8;

    /// Try to parse at the current line.
    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error>;
}

/// The block parser: an ordered rule registry plus the driver loop.
pub struct BlockParser {
    rules: Vec<Arc<dyn BlockRule>>,
}

impl BlockParser {
    /// A parser with the core CommonMark rules registered.
    pub fn new() -> Self {
        let mut parser = Self { rules: Vec::new() };
        parser.register(Arc::new(FencedCode));
        parser.register(Arc::new(AtxHeading));
        parser.register(Arc::new(SetextHeading));
        parser.register(Arc::new(ThematicBreak));
        parser.register(Arc::new(IndentedCode));
        parser.register(Arc::new(HtmlBlock));
        parser.register(Arc::new(RefDef));
        parser.register(Arc::new(BlockQuote));
        parser.register(Arc::new(List));
        parser
    }

    /// Register a rule, replacing any existing rule with the same name.
    pub fn register(&mut self, rule: Arc<dyn BlockRule>) {
        if let Some(at) = self.rules.iter().position(|r| r.name() == rule.name()) {
            self.rules[at] = rule;
            return;
        }
        let at = self
            .rules
            .partition_point(|r| r.priority() <= rule.priority());
        self.rules.insert(at, rule);
    }

    /// Registered rule names in priority order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Drive the rule loop until the state's source is exhausted.
    pub fn parse(&self, state: &mut BlockState<'_>) -> Result<(), Error> {
        while !state.eof() {
            if scan::is_blank(state.line()) {
                state.close_paragraph();
                state.advance_line();
                continue;
            }

            let cursor_before = state.cursor;
            let mut matched = false;
            for rule in &self.rules {
                if rule.apply(self, state)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                let line = state.take_line();
                state.add_paragraph(&line);
            } else if state.cursor == cursor_before {
                // A rule that claims a match must consume input.
                state.advance_line();
            }
        }
        state.close_paragraph();
        Ok(())
    }

    /// Parse a sub-source with a child state and return its tokens.
    pub fn parse_child(
        &self,
        state: &mut BlockState<'_>,
        src: String,
    ) -> Result<Vec<crate::token::Token>, Error> {
        let mut child = state.child(src);
        self.parse(&mut child)?;
        Ok(child.into_tokens())
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a line would interrupt an open paragraph.
///
/// Used for lazy-continuation decisions in block quotes, lists, and
/// the table plugin.
pub fn interrupts_paragraph(line: &str) -> bool {
    if scan::indent_width(line) > 3 {
        return false;
    }
    let trimmed = line.trim_start_matches([' ', '\t']);
    if trimmed.starts_with('>') {
        return true;
    }
    if heading::atx_level(trimmed).is_some() {
        return true;
    }
    if fence::fence_open(trimmed).is_some() {
        return true;
    }
    if thematic::thematic_line(line) {
        return true;
    }
    if let Some((marker, content)) = list::list_marker(line) {
        // Only a non-empty item can interrupt, and only an ordered item
        // numbered 1.
        if !content.trim().is_empty() && (!marker.ordered || marker.start == 1) {
            return true;
        }
    }
    if trimmed.starts_with('<') && html_block::start_condition(trimmed, true).is_some() {
        return true;
    }
    false
}
