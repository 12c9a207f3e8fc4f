//! Code spans.

use crate::inline::InlineRule;
use crate::limits;
use crate::state::InlineState;
use crate::token::Token;

/// Backtick code spans. The closing run must have exactly the opening
/// run's length; newlines inside become spaces; one leading and one
/// trailing space are stripped when both are present.
pub struct CodeSpan;

impl InlineRule for CodeSpan {
    fn name(&self) -> &'static str {
        "code_span"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn triggers(&self) -> &'static [u8] {
        b"`"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let bytes = state.src.as_bytes();
        let pos = state.pos;
        let mut open = pos;
        while open < bytes.len() && bytes[open] == b'`' {
            open += 1;
        }
        let run = open - pos;
        if run > limits::MAX_CODE_SPAN_BACKTICKS {
            return None;
        }

        // Find a closing run of exactly the same length.
        let mut at = open;
        while at < bytes.len() {
            if bytes[at] != b'`' {
                at += 1;
                continue;
            }
            let close_start = at;
            while at < bytes.len() && bytes[at] == b'`' {
                at += 1;
            }
            if at - close_start == run {
                let content = normalize_code(&state.src[open..close_start]);
                state.append(Token::text_leaf("codespan", content));
                return Some(at);
            }
        }
        None
    }
}

fn normalize_code(raw: &str) -> String {
    let content: String = raw
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let stripped = content.starts_with(' ')
        && content.ends_with(' ')
        && content.chars().any(|c| c != ' ');
    if stripped {
        content[1..content.len() - 1].to_owned()
    } else {
        content
    }
}
