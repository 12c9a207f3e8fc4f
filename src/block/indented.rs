//! Indented code blocks.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// Four-space-indented code. Cannot interrupt a paragraph.
pub struct IndentedCode;

impl BlockRule for IndentedCode {
    fn name(&self) -> &'static str {
        "indented_code"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if state.has_open_paragraph() {
            return Ok(false);
        }
        if scan::indent_width(state.line()) < 4 {
            return Ok(false);
        }

        let mut lines: Vec<String> = Vec::new();
        let mut pending_blanks = 0usize;
        while !state.eof() {
            let line = state.line();
            if scan::is_blank(line) {
                pending_blanks += 1;
                state.advance_line();
                continue;
            }
            if scan::indent_width(line) < 4 {
                break;
            }
            for _ in 0..pending_blanks {
                lines.push(String::new());
            }
            pending_blanks = 0;
            lines.push(scan::strip_columns(line, 4).into_owned());
            state.advance_line();
        }
        // Trailing blanks belong to whatever follows, and were skipped.

        let mut content = lines.join("\n");
        content.push('\n');
        state.append(Token::text_leaf("block_code", content));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Env;

    fn parse(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        let mut state = BlockState::new(src, &mut env);
        BlockParser::new().parse(&mut state).expect("parse");
        state.into_tokens()
    }

    #[test]
    fn basic_indented_code() {
        let tokens = parse("    code");
        assert_eq!(tokens[0].kind, "block_code");
        assert_eq!(tokens[0].text.as_deref(), Some("code\n"));
    }

    #[test]
    fn keeps_interior_blank_lines() {
        let tokens = parse("    a\n\n    b");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text.as_deref(), Some("a\n\nb\n"));
    }

    #[test]
    fn extra_indentation_is_preserved() {
        let tokens = parse("      six");
        assert_eq!(tokens[0].text.as_deref(), Some("  six\n"));
    }

    #[test]
    fn cannot_interrupt_paragraph() {
        let tokens = parse("para\n    still para");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "paragraph");
    }
}
