//! Bounds on pathological inputs.
//!
//! Exceeding a bound never aborts a parse; the construct that would
//! exceed it degrades to literal text instead.

/// Maximum nesting depth for block containers (lists, quotes, directives).
pub const MAX_BLOCK_NESTING: usize = 64;

/// Maximum backward-scan work per emphasis closer. Openers further away
/// than this many candidates are never considered.
pub const MAX_DELIMITER_SCAN: usize = 1024;

/// Maximum link label length in characters (CommonMark).
pub const MAX_LINK_LABEL: usize = 999;

/// Maximum parenthesis nesting in bare link destinations (CommonMark).
pub const MAX_LINK_PAREN_DEPTH: usize = 32;

/// Backtick runs longer than this are literal text, never code spans.
pub const MAX_CODE_SPAN_BACKTICKS: usize = 64;

/// Maximum digits in an ordered list marker (CommonMark).
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum table columns recognized by the table plugin.
pub const MAX_TABLE_COLUMNS: usize = 128;
