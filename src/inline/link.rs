//! Links and images.
//!
//! `[` and `![` emit marker tokens and push a bracket entry. When `]`
//! arrives, the topmost bracket is taken and the source after the `]`
//! is probed for an inline destination, a full or collapsed reference,
//! or a shortcut reference. On success the tokens between marker and
//! `]` become the link's children (with emphasis resolved inside the
//! boundary); on failure everything degrades to literal text. Links
//! never nest: resolving a link deactivates every older link bracket
//! and demotes any link that ended up inside the children.

use crate::escape::{decode_entities, encode_url};
use crate::inline::{delimiter, InlineRule};
use crate::scan;
use crate::state::{Bracket, InlineState};
use crate::token::Token;

/// Bracket handling for links and images.
pub struct LinkBracket;

impl InlineRule for LinkBracket {
    fn name(&self) -> &'static str {
        "link"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn triggers(&self) -> &'static [u8] {
        b"[]"
    }

    fn apply(&self, state: &mut InlineState<'_>) -> Option<usize> {
        if state.src.as_bytes()[state.pos] == b'[' {
            open_bracket(state)
        } else {
            close_bracket(state)
        }
    }
}

fn open_bracket(state: &mut InlineState<'_>) -> Option<usize> {
    let image = state.take_trailing_bang();
    state.append(Token::text_leaf("text", if image { "![" } else { "[" }));
    state.brackets.push(Bracket {
        token_index: state.tokens.len() - 1,
        after: state.pos + 1,
        image,
        active: true,
    });
    Some(state.pos + 1)
}

fn close_bracket(state: &mut InlineState<'_>) -> Option<usize> {
    state.flush_pending();
    let bracket = state.brackets.pop()?;
    if !bracket.active {
        return None;
    }
    let pos = state.pos;

    let mut dest: Option<(String, Option<String>, usize)> = None;
    if state.src.as_bytes().get(pos + 1) == Some(&b'(') {
        dest = inline_suffix(&state.src, pos + 1);
    }
    if dest.is_none() {
        if state.src.as_bytes().get(pos + 1) == Some(&b'[') {
            if let Some((label, after)) = scan::link_label(&state.src, pos + 2) {
                // collapsed form `[]` falls back to the bracket text
                let key = if label.trim().is_empty() {
                    &state.src[bracket.after..pos]
                } else {
                    label
                };
                if let Some(found) = state.env.get_ref(key) {
                    dest = Some((found.url.clone(), found.title.clone(), after));
                }
            } else {
                dest = shortcut_ref(state, &bracket, pos);
            }
        } else {
            dest = shortcut_ref(state, &bracket, pos);
        }
    }

    let (url, title, end) = dest?;

    let children = state.tokens.split_off(bracket.token_index + 1);
    state.tokens.pop();
    let mut children = delimiter::resolve(children);
    if !bracket.image {
        demote_nested_links(&mut children);
        for open in &mut state.brackets {
            if !open.image {
                open.active = false;
            }
        }
    }

    let kind = if bracket.image { "image" } else { "link" };
    let mut token = Token::container(kind, children).with_attr("url", url);
    if let Some(title) = title {
        token.set_attr("title", title);
    }
    state.tokens.push(token);
    Some(end)
}

fn shortcut_ref(
    state: &InlineState<'_>,
    bracket: &Bracket,
    pos: usize,
) -> Option<(String, Option<String>, usize)> {
    let label = &state.src[bracket.after..pos];
    if label.trim().is_empty() {
        return None;
    }
    let found = state.env.get_ref(label)?;
    Some((found.url.clone(), found.title.clone(), pos + 1))
}

/// Parse `(dest "title")` starting at the `(`.
fn inline_suffix(src: &str, open: usize) -> Option<(String, Option<String>, usize)> {
    let at = scan::skip_spaces_and_newline(src, open + 1);
    if src.as_bytes().get(at) == Some(&b')') {
        return Some((String::new(), None, at + 1));
    }
    let (dest_raw, after_dest) = scan::link_destination(src, at)?;
    let url = finish_url(dest_raw);

    let at = scan::skip_spaces_and_newline(src, after_dest);
    if src.as_bytes().get(at) == Some(&b')') {
        return Some((url, None, at + 1));
    }
    if at == after_dest {
        return None;
    }
    let (title_raw, after_title) = scan::link_title(src, at)?;
    let title = finish_text(title_raw);

    let at = scan::skip_spaces_and_newline(src, after_title);
    if src.as_bytes().get(at) == Some(&b')') {
        Some((url, Some(title), at + 1))
    } else {
        None
    }
}

fn finish_url(raw: &str) -> String {
    encode_url(&decode_entities(&scan::unescape(raw)))
}

fn finish_text(raw: &str) -> String {
    decode_entities(&scan::unescape(raw)).into_owned()
}

/// Replace any nested `link` token with its children.
fn demote_nested_links(tokens: &mut Vec<Token>) {
    let mut out = Vec::with_capacity(tokens.len());
    for mut token in tokens.drain(..) {
        if let Some(children) = token.children.as_mut() {
            demote_nested_links(children);
        }
        if token.kind == "link" {
            out.extend(token.children.take().unwrap_or_default());
        } else {
            out.push(token);
        }
    }
    *tokens = out;
}

#[cfg(test)]
mod tests {
    use crate::inline::InlineParser;
    use crate::state::{Env, InlineState};
    use crate::token::Token;

    fn parse_with(src: &str, env: &mut Env) -> Vec<Token> {
        let mut state = InlineState::new(src, env);
        InlineParser::new().parse(&mut state);
        state.into_tokens()
    }

    fn parse(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        parse_with(src, &mut env)
    }

    #[test]
    fn inline_link() {
        let tokens = parse("[text](/url)");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "link");
        assert_eq!(tokens[0].attr_str("url"), Some("/url"));
        let children = tokens[0].children.as_deref().expect("children");
        assert_eq!(children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn inline_link_with_title() {
        let tokens = parse("[a](/u \"my title\")");
        assert_eq!(tokens[0].attr_str("title"), Some("my title"));
    }

    #[test]
    fn angle_destination() {
        let tokens = parse("[a](<u v>)");
        assert_eq!(tokens[0].attr_str("url"), Some("u%20v"));
    }

    #[test]
    fn empty_destination() {
        let tokens = parse("[a]()");
        assert_eq!(tokens[0].attr_str("url"), Some(""));
    }

    #[test]
    fn image() {
        let tokens = parse("![alt](/img.png)");
        assert_eq!(tokens[0].kind, "image");
        assert_eq!(tokens[0].attr_str("url"), Some("/img.png"));
    }

    #[test]
    fn unmatched_brackets_are_literal() {
        let tokens = parse("[not a link]");
        let text: String = tokens
            .iter()
            .map(|t| t.text.clone().unwrap_or_default())
            .collect();
        assert_eq!(text, "[not a link]");
    }

    #[test]
    fn reference_link() {
        let mut env = Env::default();
        env.add_ref("bar", "/url".into(), Some("t".into()));
        let tokens = parse_with("[foo][bar]", &mut env);
        assert_eq!(tokens[0].kind, "link");
        assert_eq!(tokens[0].attr_str("url"), Some("/url"));
        assert_eq!(tokens[0].attr_str("title"), Some("t"));
    }

    #[test]
    fn collapsed_and_shortcut_references() {
        let mut env = Env::default();
        env.add_ref("foo", "/url".into(), None);
        let tokens = parse_with("[foo][]", &mut env);
        assert_eq!(tokens[0].kind, "link");
        let tokens = parse_with("[foo]", &mut env);
        assert_eq!(tokens[0].kind, "link");
    }

    #[test]
    fn unknown_reference_is_literal() {
        let tokens = parse("[foo][nope]");
        assert!(tokens.iter().all(|t| t.kind != "link"));
    }

    #[test]
    fn emphasis_inside_link_text() {
        let tokens = parse("[*em*](/u)");
        let children = tokens[0].children.as_deref().expect("children");
        assert_eq!(children[0].kind, "emphasis");
    }

    #[test]
    fn emphasis_cannot_cross_link_boundary() {
        let tokens = parse("*a [b*](/u)");
        let link = tokens.iter().find(|t| t.kind == "link").expect("link");
        let children = link.children.as_deref().expect("children");
        assert!(children.iter().all(|t| t.kind != "emphasis"));
    }

    #[test]
    fn links_do_not_nest() {
        // The innermost link binds; the outer brackets degrade.
        let mut env = Env::default();
        env.add_ref("inner", "/i".into(), None);
        let tokens = parse_with("[a [inner] b](/outer)", &mut env);
        let links: Vec<_> = tokens.iter().filter(|t| t.kind == "link").collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr_str("url"), Some("/i"));
        fn no_link_descendant(t: &Token) -> bool {
            t.children
                .as_deref()
                .map_or(true, |c| c.iter().all(|k| k.kind != "link" && no_link_descendant(k)))
        }
        assert!(no_link_descendant(links[0]));
    }

    #[test]
    fn autolink_inside_link_text_is_demoted() {
        let tokens = parse("[a <https://x.io> b](/u)");
        assert_eq!(tokens[0].kind, "link");
        assert_eq!(tokens[0].attr_str("url"), Some("/u"));
        fn kinds(t: &Token, out: &mut Vec<String>) {
            out.push(t.kind.to_string());
            for c in t.children.as_deref().unwrap_or_default() {
                kinds(c, out);
            }
        }
        let mut all = Vec::new();
        kinds(&tokens[0], &mut all);
        assert_eq!(all.iter().filter(|k| *k == "link").count(), 1);
    }

    #[test]
    fn image_inside_link_is_allowed() {
        let tokens = parse("[![alt](/img)](/page)");
        assert_eq!(tokens[0].kind, "link");
        let children = tokens[0].children.as_deref().expect("children");
        assert_eq!(children[0].kind, "image");
    }
}
