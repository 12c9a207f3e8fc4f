//! Inline phase: a trigger-table scan with prioritized rules, followed
//! by the delimiter-resolution pass.
//!
//! The driver walks the leaf text byte by byte. Bytes that no rule
//! triggers on accumulate as pending literal text; at a trigger byte
//! the rules run in priority order. Emphasis delimiters and link
//! brackets emit placeholder tokens that later passes resolve.

mod autolink;
mod code_span;
pub mod delimiter;
mod link;
mod raw_html;

pub use autolink::Autolink;
pub use code_span::CodeSpan;
pub use delimiter::EmphasisDelimiter;
pub use link::LinkBracket;
pub use raw_html::RawHtml;

use std::sync::Arc;

use crate::state::InlineState;
use crate::token::Token;

/// An inline rule.
///
/// `apply` inspects `state.src` at `state.pos` and, on a match, emits
/// tokens and returns the position after everything it consumed.
pub trait InlineRule: Send + Sync {
    /// Unique rule name; re-registering a name replaces the rule.
    fn name(&self) -> &'static str;

    /// Priority; lower runs earlier.
    fn priority(&self) -> u8;

    /// Bytes this rule can start at.
    fn triggers(&self) -> &'static [u8];

    /// Try to match at `state.pos`.
    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize>;
}

/// The inline parser: rule registry, trigger table, scan driver.
pub struct InlineParser {
    rules: Vec<Arc<dyn InlineRule>>,
    triggers: [bool; 256],
}

impl InlineParser {
    /// A parser with the core CommonMark rules registered.
    pub fn new() -> Self {
        let mut parser = Self {
            rules: Vec::new(),
            triggers: [false; 256],
        };
        parser.register(Arc::new(Escape));
        parser.register(Arc::new(CodeSpan));
        parser.register(Arc::new(RawHtml));
        parser.register(Arc::new(Autolink));
        parser.register(Arc::new(LinkBracket));
        parser.register(Arc::new(EmphasisDelimiter));
        parser.register(Arc::new(Linebreak));
        parser
    }

    /// Register a rule, replacing any existing rule with the same name.
    pub fn register(&mut self, rule: Arc<dyn InlineRule>) {
        if let Some(at) = self.rules.iter().position(|r| r.name() == rule.name()) {
            self.rules[at] = rule;
        } else {
            let at = self
                .rules
                .partition_point(|r| r.priority() <= rule.priority());
            self.rules.insert(at, rule);
        }
        self.triggers = [false; 256];
        for rule in &self.rules {
            for &b in rule.triggers() {
                self.triggers[b as usize] = true;
            }
        }
    }

    /// Registered rule names in priority order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Scan one leaf's text, leaving resolved tokens in the state.
    pub fn parse(&self, state: &mut InlineState<'_>) {
        let mut pos = 0;
        while pos < state.src.len() {
            let byte = state.src.as_bytes()[pos];
            if self.triggers[byte as usize] {
                state.pos = pos;
                if let Some(new_pos) = self.apply_rules(byte, state) {
                    pos = new_pos;
                    continue;
                }
            }
            let ch_len = char_len(byte);
            for at in pos..(pos + ch_len).min(state.src.len()) {
                let b = state.src.as_bytes()[at];
                state.push_literal_byte(b);
            }
            pos += ch_len;
        }
        state.flush_pending();
        let tokens = std::mem::take(&mut state.tokens);
        state.tokens = delimiter::resolve(tokens);
    }

    fn apply_rules(&self, byte: u8, state: &mut InlineState<'_>) -> Option<usize> {
        let pos = state.pos;
        for rule in &self.rules {
            if !rule.triggers().contains(&byte) {
                continue;
            }
            if let Some(new_pos) = rule.apply(state) {
                // Rules must consume input.
                if new_pos > pos {
                    return Some(new_pos);
                }
            }
            state.pos = pos;
        }
        None
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

/// Backslash escapes; `\` before a newline is a hard break.
pub struct Escape;

impl InlineRule for Escape {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn priority(&self) -> u8 {
        0
    }

    fn triggers(&self) -> &'static [u8] {
        b"\\"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let next = *state.src.as_bytes().get(state.pos + 1)?;
        if next == b'\n' {
            state.trim_pending_spaces();
            state.append(Token::new("linebreak"));
            return Some(skip_line_start_spaces(state.src.as_bytes(), state.pos + 2));
        }
        if crate::scan::is_ascii_punct(next) {
            state.append(Token::text_leaf("text", (next as char).to_string()));
            return Some(state.pos + 2);
        }
        None
    }
}

/// Hard (`  \n`) and soft line breaks.
pub struct Linebreak;

impl InlineRule for Linebreak {
    fn name(&self) -> &'static str {
        "linebreak"
    }

    fn priority(&self) -> u8 {
        60
    }

    fn triggers(&self) -> &'static [u8] {
        b"\n"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let spaces = state.trim_pending_spaces();
        let kind = if spaces >= 2 { "linebreak" } else { "softbreak" };
        state.append(Token::new(kind));
        Some(skip_line_start_spaces(state.src.as_bytes(), state.pos + 1))
    }
}

fn skip_line_start_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}
