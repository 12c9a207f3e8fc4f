//! Delimiter runs and emphasis resolution.
//!
//! The emphasis rule emits `emph_delim` placeholder tokens annotated
//! with the run character and flanking flags. After the scan,
//! [`resolve`] matches closers to the nearest compatible opener
//! (CommonMark rules: flanking, rule of three, crossed-opener removal)
//! and rebuilds the token list with nested containers. Unmatched
//! delimiters degrade to literal text.

use crate::inline::InlineRule;
use crate::limits;
use crate::state::InlineState;
use crate::token::Token;

/// `*` and `_` delimiter runs.
pub struct EmphasisDelimiter;

impl InlineRule for EmphasisDelimiter {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn triggers(&self) -> &'static [u8] {
        b"*_"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        emit_delimiter_run(state, false)
    }
}

/// Emit a delimiter placeholder for the run at `state.pos`.
///
/// `tilde` restricts the run to `~~` (the strikethrough form); other
/// tilde runs stay literal. Returns the position after the run.
pub(crate) fn emit_delimiter_run(state: &mut InlineState<'_>, tilde: bool) -> Option<usize> {
    let bytes = state.src.as_bytes();
    let pos = state.pos;
    let ch = bytes[pos];
    let mut end = pos;
    while end < bytes.len() && bytes[end] == ch {
        end += 1;
    }
    if tilde && end - pos != 2 {
        return None;
    }

    let (can_open, can_close) = flanking(&state.src, pos, end, ch);
    if !can_open && !can_close {
        return None;
    }

    let run = state.src[pos..end].to_owned();
    let mut token = Token::text_leaf("emph_delim", run);
    token.set_attr("char", (ch as char).to_string());
    token.set_attr("can_open", can_open);
    token.set_attr("can_close", can_close);
    state.append(token);
    Some(end)
}

/// Compute left/right flanking per CommonMark, then derive the
/// open/close capability for the run character.
fn flanking(src: &str, start: usize, end: usize, ch: u8) -> (bool, bool) {
    let before = src[..start].chars().next_back();
    let after = src[end..].chars().next();

    let before_ws = before.map_or(true, char::is_whitespace);
    let after_ws = after.map_or(true, char::is_whitespace);
    let before_punct = before.is_some_and(is_punctuation);
    let after_punct = after.is_some_and(is_punctuation);

    let left_flanking = !after_ws && (!after_punct || before_ws || before_punct);
    let right_flanking = !before_ws && (!before_punct || after_ws || after_punct);

    if ch == b'_' {
        // Underscores may not open or close inside a word.
        (
            left_flanking && (!right_flanking || before_punct),
            right_flanking && (!left_flanking || after_punct),
        )
    } else {
        (left_flanking, right_flanking)
    }
}

/// Punctuation for flanking purposes: anything printable that is
/// neither alphanumeric nor whitespace.
#[inline]
fn is_punctuation(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace()
}

struct Delim {
    token_index: usize,
    ch: u8,
    orig_len: usize,
    len: usize,
    can_open: bool,
    can_close: bool,
    active: bool,
    /// `(count, match id)` in discovery order (innermost first).
    closes: Vec<(usize, u32)>,
    /// `(count, match id)` in discovery order.
    opens: Vec<(usize, u32)>,
}

/// Resolve all delimiter placeholders in `tokens`, producing nested
/// `emphasis` / `strong` / `strikethrough` containers.
pub fn resolve(tokens: Vec<Token>) -> Vec<Token> {
    let mut delims: Vec<Delim> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if token.kind != "emph_delim" {
            continue;
        }
        let run = token.text.as_deref().unwrap_or("");
        let ch = token
            .attr_str("char")
            .and_then(|s| s.bytes().next())
            .unwrap_or(b'*');
        delims.push(Delim {
            token_index: index,
            ch,
            orig_len: run.len(),
            len: run.len(),
            can_open: token.attr_flag("can_open"),
            can_close: token.attr_flag("can_close"),
            active: true,
            closes: Vec::new(),
            opens: Vec::new(),
        });
    }
    if delims.is_empty() {
        return tokens;
    }

    match_delims(&mut delims);
    rebuild(tokens, delims)
}

fn match_delims(delims: &mut [Delim]) {
    let mut next_id = 0u32;
    for closer in 0..delims.len() {
        if !delims[closer].can_close {
            continue;
        }
        while delims[closer].len > 0 {
            let Some(opener) = find_opener(delims, closer) else {
                break;
            };
            let count = if delims[closer].ch == b'~' {
                2
            } else {
                delims[opener].len.min(delims[closer].len).min(2)
            };
            let id = next_id;
            next_id += 1;
            delims[opener].opens.push((count, id));
            delims[closer].closes.push((count, id));
            delims[opener].len -= count;
            delims[closer].len -= count;
            // Openers crossed by this match can never match again.
            for crossed in &mut delims[opener + 1..closer] {
                crossed.active = false;
            }
        }
    }
}

fn find_opener(delims: &[Delim], closer: usize) -> Option<usize> {
    let close = &delims[closer];
    let mut scanned = 0usize;
    for opener in (0..closer).rev() {
        scanned += 1;
        if scanned > limits::MAX_DELIMITER_SCAN {
            return None;
        }
        let open = &delims[opener];
        if !open.active || open.len == 0 || !open.can_open || open.ch != close.ch {
            continue;
        }
        if close.ch == b'~' {
            if open.len >= 2 && close.len >= 2 {
                return Some(opener);
            }
            continue;
        }
        // Rule of three: when one side can both open and close, runs
        // whose combined length is a multiple of 3 cannot match unless
        // both are themselves multiples of 3.
        if (close.can_open || open.can_close)
            && (open.orig_len + close.orig_len) % 3 == 0
            && !(open.orig_len % 3 == 0 && close.orig_len % 3 == 0)
        {
            continue;
        }
        return Some(opener);
    }
    None
}

fn rebuild(tokens: Vec<Token>, delims: Vec<Delim>) -> Vec<Token> {
    let mut by_index: rustc_hash::FxHashMap<usize, Delim> = delims
        .into_iter()
        .map(|d| (d.token_index, d))
        .collect();

    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<(Token, u32)> = Vec::new();

    fn emit(out: &mut Vec<Token>, stack: &mut [(Token, u32)], token: Token) {
        if let Some((container, _)) = stack.last_mut() {
            container.push_child(token);
        } else {
            out.push(token);
        }
    }

    for (index, token) in tokens.into_iter().enumerate() {
        let Some(delim) = by_index.remove(&index) else {
            emit(&mut out, &mut stack, token);
            continue;
        };

        for &(_, id) in &delim.closes {
            if let Some((container, open_id)) = stack.pop() {
                debug_assert_eq!(open_id, id);
                emit(&mut out, &mut stack, container);
            }
        }
        if delim.len > 0 {
            let literal = (delim.ch as char).to_string().repeat(delim.len);
            emit(&mut out, &mut stack, Token::text_leaf("text", literal));
        }
        for &(count, id) in delim.opens.iter().rev() {
            let kind = container_kind(delim.ch, count);
            stack.push((Token::container(kind, Vec::new()), id));
        }
    }

    // Unmatched opens cannot normally remain; flatten defensively.
    while let Some((container, _)) = stack.pop() {
        let children = container.children.unwrap_or_default();
        if let Some((parent, _)) = stack.last_mut() {
            for child in children {
                parent.push_child(child);
            }
        } else {
            out.extend(children);
        }
    }
    out
}

fn container_kind(ch: u8, count: usize) -> &'static str {
    match (ch, count) {
        (b'~', _) => "strikethrough",
        (_, 2) => "strong",
        _ => "emphasis",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineParser;
    use crate::state::{Env, InlineState};

    fn parse(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        let mut state = InlineState::new(src, &mut env);
        InlineParser::new().parse(&mut state);
        state.into_tokens()
    }

    #[test]
    fn simple_emphasis() {
        let tokens = parse("a *b* c");
        assert_eq!(tokens[1].kind, "emphasis");
        let children = tokens[1].children.as_deref().expect("children");
        assert_eq!(children[0].text.as_deref(), Some("b"));
    }

    #[test]
    fn strong_emphasis() {
        let tokens = parse("**b**");
        assert_eq!(tokens[0].kind, "strong");
    }

    #[test]
    fn triple_run_nests_strong_in_em() {
        let tokens = parse("***b***");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "emphasis");
        let inner = &tokens[0].children.as_deref().expect("children")[0];
        assert_eq!(inner.kind, "strong");
    }

    #[test]
    fn strong_inside_emphasis() {
        let tokens = parse("*foo **bar***");
        assert_eq!(tokens[0].kind, "emphasis");
        let children = tokens[0].children.as_deref().expect("children");
        assert_eq!(children[0].text.as_deref(), Some("foo "));
        assert_eq!(children[1].kind, "strong");
    }

    #[test]
    fn unmatched_is_literal() {
        let tokens = parse("a * b");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text.as_deref(), Some("a * b"));
    }

    #[test]
    fn mismatched_chars_stay_literal() {
        let tokens = parse("*a_");
        let text: String = tokens
            .iter()
            .map(|t| t.text.clone().unwrap_or_default())
            .collect();
        assert_eq!(text, "*a_");
    }

    #[test]
    fn intraword_underscore_is_literal() {
        let tokens = parse("foo_bar_baz");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text.as_deref(), Some("foo_bar_baz"));
    }

    #[test]
    fn intraword_asterisk_works() {
        let tokens = parse("foo*bar*baz");
        assert!(tokens.iter().any(|t| t.kind == "emphasis"));
    }

    #[test]
    fn partial_consumption_leaves_literal() {
        let tokens = parse("*a**");
        let has_emphasis = tokens.iter().any(|t| t.kind == "emphasis");
        assert!(has_emphasis);
        // leftover delimiter stays literal
        let literal: String = tokens
            .iter()
            .filter(|t| t.kind == "text")
            .map(|t| t.text.clone().unwrap_or_default())
            .collect();
        assert!(literal.contains('*'));
    }

    #[test]
    fn punctuation_flanking() {
        // a*"foo"* — first * follows a letter and precedes punctuation,
        // so it cannot open.
        let tokens = parse("a*\"foo\"*");
        assert!(tokens.iter().all(|t| t.kind != "emphasis"));
    }
}
