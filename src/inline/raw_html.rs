//! Raw inline HTML.

use crate::inline::InlineRule;
use crate::scan;
use crate::state::InlineState;
use crate::token::Token;

/// Inline HTML constructs, carried through as `inline_html` tokens.
/// The renderer decides whether to emit or escape them.
pub struct RawHtml;

impl InlineRule for RawHtml {
    fn name(&self) -> &'static str {
        "raw_html"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn triggers(&self) -> &'static [u8] {
        b"<"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        let end = scan::inline_html(&state.src, state.pos)?;
        let raw = state.src[state.pos..end].to_owned();
        state.append(Token::text_leaf("inline_html", raw));
        Some(end)
    }
}

#[cfg(test)]
mod tests {
    use crate::inline::InlineParser;
    use crate::state::{Env, InlineState};
    use crate::token::Token;

    fn parse(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        let mut state = InlineState::new(src, &mut env);
        InlineParser::new().parse(&mut state);
        state.into_tokens()
    }

    #[test]
    fn open_and_close_tags() {
        let tokens = parse("a <em>b</em> c");
        assert_eq!(tokens[1].kind, "inline_html");
        assert_eq!(tokens[1].text.as_deref(), Some("<em>"));
        assert_eq!(tokens[3].kind, "inline_html");
    }

    #[test]
    fn comment() {
        let tokens = parse("x <!-- y --> z");
        assert_eq!(tokens[1].kind, "inline_html");
        assert_eq!(tokens[1].text.as_deref(), Some("<!-- y -->"));
    }

    #[test]
    fn bad_tag_is_text() {
        let tokens = parse("1 < 2");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text.as_deref(), Some("1 < 2"));
    }
}
