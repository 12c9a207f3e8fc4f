//! Parser state for the block and inline phases.
//!
//! `Env` is the document-scoped side table: the link reference map plus
//! data accumulated by plugins (footnotes, abbreviations, headings).
//! `BlockState` and `InlineState` are per-phase working state; a child
//! `BlockState` sees a prefix-stripped virtual sub-source and shares
//! the parent's env.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::escape::decode_entities;
use crate::scan::unescape;
use crate::token::Token;

/// A link reference definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    /// Destination, percent-encoded for output.
    pub url: String,
    /// Optional title, entity-decoded.
    pub title: Option<String>,
}

/// Normalize a link label: decode entities, drop escapes, collapse
/// whitespace runs, trim, case-fold. Idempotent.
pub fn normalize_label(label: &str) -> String {
    let decoded = decode_entities(label);
    let unescaped = unescape(&decoded);
    let mut out = String::with_capacity(unescaped.len());
    let mut in_ws = true;
    for ch in unescaped.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                out.push(' ');
                in_ws = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            in_ws = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Footnote definitions and reference ordering.
///
/// Definitions are captured during the block phase keyed by normalized
/// label (first definition wins). References are numbered by order of
/// first use during the inline phase.
#[derive(Debug, Default)]
pub struct FootnoteStore {
    defs: FxHashMap<String, String>,
    order: Vec<String>,
}

impl FootnoteStore {
    /// Store a definition if the label is new.
    pub fn define(&mut self, label: &str, content: String) {
        let key = normalize_label(label);
        self.defs.entry(key).or_insert(content);
    }

    /// Whether a definition exists for `label`.
    pub fn is_defined(&self, label: &str) -> bool {
        self.defs.contains_key(&normalize_label(label))
    }

    /// Number a reference (1-based), assigning the next index on first use.
    pub fn ref_index(&mut self, label: &str) -> Option<usize> {
        let key = normalize_label(label);
        if !self.defs.contains_key(&key) {
            return None;
        }
        if let Some(at) = self.order.iter().position(|k| k == &key) {
            return Some(at + 1);
        }
        self.order.push(key);
        Some(self.order.len())
    }

    /// Labels in reference order.
    pub fn ordered_labels(&self) -> &[String] {
        &self.order
    }

    /// Definition content for a normalized label.
    pub fn content(&self, key: &str) -> Option<&str> {
        self.defs.get(key).map(String::as_str)
    }

    /// Whether any definition was captured.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// A heading collected for TOC resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingEntry {
    /// Heading level 1–6.
    pub level: u8,
    /// Plain text of the heading.
    pub text: String,
    /// Deduplicated slug.
    pub slug: String,
}

/// Document-scoped side data shared by both phases.
#[derive(Debug, Default)]
pub struct Env {
    /// Link reference map, keyed by normalized label.
    pub ref_links: FxHashMap<String, LinkRef>,
    /// Footnote definitions and ordering.
    pub footnotes: FootnoteStore,
    /// Abbreviation definitions: key → expansion.
    pub abbreviations: FxHashMap<String, String>,
    /// Headings collected for TOC resolution.
    pub headings: Vec<HeadingEntry>,
    /// Base directory for the include directive.
    pub base_dir: Option<PathBuf>,
}

impl Env {
    /// Insert a link reference definition. The first definition wins.
    pub fn add_ref(&mut self, label: &str, url: String, title: Option<String>) {
        let key = normalize_label(label);
        if key.is_empty() {
            return;
        }
        self.ref_links.entry(key).or_insert(LinkRef { url, title });
    }

    /// Look up a link reference by label.
    pub fn get_ref(&self, label: &str) -> Option<&LinkRef> {
        self.ref_links.get(&normalize_label(label))
    }
}

/// Working state of the block phase over one (sub-)source.
pub struct BlockState<'env> {
    /// The (virtual) source this state parses. Newlines are `\n`.
    pub src: String,
    /// Byte offset of the current line start.
    pub cursor: usize,
    /// Block tokens emitted so far.
    pub tokens: Vec<Token>,
    /// Shared document env.
    pub env: &'env mut Env,
    /// Container nesting depth of this state.
    pub depth: usize,
    paragraph: Vec<String>,
}

impl<'env> BlockState<'env> {
    /// Root state over a full source.
    pub fn new(src: impl Into<String>, env: &'env mut Env) -> Self {
        Self {
            src: src.into(),
            cursor: 0,
            tokens: Vec::new(),
            env,
            depth: 0,
            paragraph: Vec::new(),
        }
    }

    /// Child state over a prefix-stripped sub-source.
    pub fn child(&mut self, src: String) -> BlockState<'_> {
        BlockState {
            src,
            cursor: 0,
            tokens: Vec::new(),
            env: &mut *self.env,
            depth: self.depth + 1,
            paragraph: Vec::new(),
        }
    }

    /// Whether the cursor is past the last line.
    pub fn eof(&self) -> bool {
        self.cursor >= self.src.len()
    }

    /// The line `n` lines ahead of the cursor (0 = current), without
    /// its newline.
    pub fn peek_line(&self, n: usize) -> Option<&str> {
        let mut start = self.cursor;
        for _ in 0..n {
            start = match memchr::memchr(b'\n', self.src[start..].as_bytes()) {
                Some(at) => start + at + 1,
                None => return None,
            };
        }
        if start >= self.src.len() {
            return None;
        }
        let end = memchr::memchr(b'\n', self.src[start..].as_bytes())
            .map_or(self.src.len(), |at| start + at);
        Some(&self.src[start..end])
    }

    /// The current line without its newline. Empty at EOF.
    pub fn line(&self) -> &str {
        self.peek_line(0).unwrap_or("")
    }

    /// Advance the cursor past the current line.
    pub fn advance_line(&mut self) {
        self.cursor = match memchr::memchr(b'\n', self.src[self.cursor..].as_bytes()) {
            Some(at) => self.cursor + at + 1,
            None => self.src.len(),
        };
    }

    /// Consume and return the current line.
    pub fn take_line(&mut self) -> String {
        let line = self.line().to_owned();
        self.advance_line();
        line
    }

    /// Emit a token, closing any open paragraph first.
    pub fn append(&mut self, token: Token) {
        self.close_paragraph();
        self.tokens.push(token);
    }

    /// Add an unmatched line to the open paragraph.
    pub fn add_paragraph(&mut self, line: &str) {
        self.paragraph.push(line.trim_start().to_owned());
    }

    /// Whether a paragraph is accumulating.
    pub fn has_open_paragraph(&self) -> bool {
        !self.paragraph.is_empty()
    }

    /// Take the accumulated paragraph text without emitting a token.
    /// Used by the setext rule.
    pub fn take_paragraph(&mut self) -> Option<String> {
        if self.paragraph.is_empty() {
            return None;
        }
        let mut text = self.paragraph.join("\n");
        self.paragraph.clear();
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        Some(text)
    }

    /// Flush the open paragraph into a raw `paragraph` leaf.
    pub fn close_paragraph(&mut self) {
        if let Some(text) = self.take_paragraph() {
            if !text.is_empty() {
                self.tokens.push(Token::text_leaf("paragraph", text));
            }
        }
    }

    /// Insert a link reference definition (first wins).
    pub fn add_def(&mut self, label: &str, url: String, title: Option<String>) {
        self.env.add_ref(label, url, title);
    }

    /// Finish this state, flushing any open paragraph.
    pub fn into_tokens(mut self) -> Vec<Token> {
        self.close_paragraph();
        self.tokens
    }
}

/// A pending `[` / `![` marker during the inline scan.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    /// Index of the marker token in the token list.
    pub token_index: usize,
    /// Source position just after the bracket.
    pub after: usize,
    /// Whether this is an image marker.
    pub image: bool,
    /// Deactivated markers degrade to literal text.
    pub active: bool,
}

/// Working state of the inline phase over one raw leaf.
pub struct InlineState<'env> {
    /// The text under analysis.
    pub src: String,
    /// Current scan position (set by the driver before each rule).
    pub pos: usize,
    /// Inline tokens emitted so far.
    pub tokens: Vec<Token>,
    /// Open bracket markers.
    pub brackets: Vec<Bracket>,
    /// Shared document env.
    pub env: &'env mut Env,
    pending: Vec<u8>,
}

impl<'env> InlineState<'env> {
    /// New state over one leaf's text.
    pub fn new(src: impl Into<String>, env: &'env mut Env) -> Self {
        Self {
            src: src.into(),
            pos: 0,
            tokens: Vec::new(),
            brackets: Vec::new(),
            env,
            pending: Vec::new(),
        }
    }

    /// Emit a token, flushing pending literal text first.
    pub fn append(&mut self, token: Token) {
        self.flush_pending();
        self.tokens.push(token);
    }

    /// Queue literal text; entities are decoded at flush time.
    pub fn push_literal(&mut self, text: &str) {
        self.pending.extend_from_slice(text.as_bytes());
    }

    /// Queue a single literal byte (must be ASCII or part of a
    /// sequence pushed in order).
    pub fn push_literal_byte(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    /// Remove one trailing `!` from the pending text, if present and
    /// not itself escaped. Used by the bracket rule to detect `![`.
    pub fn take_trailing_bang(&mut self) -> bool {
        if self.pending.last() == Some(&b'!') {
            self.pending.pop();
            true
        } else {
            false
        }
    }

    /// Strip trailing spaces from pending text, returning how many.
    pub fn trim_pending_spaces(&mut self) -> usize {
        let mut count = 0;
        while self.pending.last() == Some(&b' ') {
            self.pending.pop();
            count += 1;
        }
        count
    }

    /// Flush pending literal text into a `text` token.
    pub fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let raw = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        let text = decode_entities(&raw).into_owned();
        self.tokens.push(Token::text_leaf("text", text));
    }

    /// Finish, flushing pending text.
    pub fn into_tokens(mut self) -> Vec<Token> {
        self.flush_pending();
        self.tokens
    }
}
