//! Block quotes with lazy continuation.

use crate::block::{interrupts_paragraph, BlockParser, BlockRule};
use crate::error::Error;
use crate::limits;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// `>`-prefixed lines; a non-blank unprefixed line continues the last
/// paragraph inside the quote.
pub struct BlockQuote;

impl BlockRule for BlockQuote {
    fn name(&self) -> &'static str {
        "block_quote"
    }

    fn priority(&self) -> u8 {
        80
    }

    fn apply(&self, parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        {
            let line = state.line();
            if scan::indent_width(line) > 3
                || !line.trim_start_matches([' ', '\t']).starts_with('>')
            {
                return Ok(false);
            }
        }
        if state.depth >= limits::MAX_BLOCK_NESTING {
            return Ok(false);
        }

        let mut inner = String::new();
        let mut paragraph_open = false;
        while !state.eof() {
            let line = state.line();
            let trimmed = line.trim_start_matches([' ', '\t']);
            if scan::indent_width(line) <= 3 && trimmed.starts_with('>') {
                let mut rest = &trimmed[1..];
                if let Some(stripped) = rest.strip_prefix(' ') {
                    rest = stripped;
                }
                paragraph_open = !scan::is_blank(rest) && !interrupts_paragraph(rest);
                inner.push_str(rest);
                inner.push('\n');
                state.advance_line();
            } else if paragraph_open && !scan::is_blank(line) && !interrupts_paragraph(line) {
                // lazy continuation
                inner.push_str(line);
                inner.push('\n');
                state.advance_line();
            } else {
                break;
            }
        }

        let children = parser.parse_child(state, inner)?;
        state.append(Token::container("block_quote", children));
        Ok(true)
    }
}
