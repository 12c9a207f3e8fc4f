//! Thematic breaks.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// Three or more `-`, `*` or `_`, optionally space-separated.
pub struct ThematicBreak;

/// Whether a line is a thematic break.
pub(super) fn thematic_line(line: &str) -> bool {
    if scan::indent_width(line) > 3 {
        return false;
    }
    let mut marker = 0u8;
    let mut count = 0usize;
    for b in line.bytes() {
        match b {
            b' ' | b'\t' => {}
            b'-' | b'*' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if marker != b {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

impl BlockRule for ThematicBreak {
    fn name(&self) -> &'static str {
        "thematic_break"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        if !thematic_line(state.line()) {
            return Ok(false);
        }
        state.advance_line();
        state.append(Token::new("thematic_break"));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_breaks() {
        assert!(thematic_line("---"));
        assert!(thematic_line("***"));
        assert!(thematic_line("___"));
        assert!(thematic_line("- - -"));
        assert!(thematic_line("   ----------"));
    }

    #[test]
    fn rejects_non_breaks() {
        assert!(!thematic_line("--"));
        assert!(!thematic_line("-*-"));
        assert!(!thematic_line("--- x"));
        assert!(!thematic_line("    ---"));
    }
}
