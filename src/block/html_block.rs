//! HTML blocks: the seven CommonMark start conditions.

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::scan;
use crate::state::BlockState;
use crate::token::Token;

/// Tag names that open a type-6 HTML block.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Tag names whose content runs to an explicit closer (type 1).
const VERBATIM_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

/// How an HTML block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HtmlEnd {
    /// Line containing one of the closing tags for type 1.
    VerbatimClose,
    /// Line containing `-->`.
    Comment,
    /// Line containing `?>`.
    Instruction,
    /// Line containing `>`.
    Declaration,
    /// Line containing `]]>`.
    Cdata,
    /// First blank line (types 6 and 7).
    BlankLine,
}

/// Detect an HTML-block start on a whitespace-trimmed line.
///
/// `interrupting` is true when a paragraph is open; a type-7 block may
/// not start there.
pub(super) fn start_condition(trimmed: &str, interrupting: bool) -> Option<HtmlEnd> {
    if !trimmed.starts_with('<') {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();

    for tag in VERBATIM_TAGS {
        let prefix = format!("<{tag}");
        if let Some(rest) = lower.strip_prefix(&prefix) {
            if rest.is_empty() || rest.starts_with([' ', '\t', '>']) {
                return Some(HtmlEnd::VerbatimClose);
            }
        }
    }
    if lower.starts_with("<!--") {
        return Some(HtmlEnd::Comment);
    }
    if lower.starts_with("<?") {
        return Some(HtmlEnd::Instruction);
    }
    if lower.starts_with("<![cdata[") {
        return Some(HtmlEnd::Cdata);
    }
    if trimmed.len() > 2 && trimmed.as_bytes()[1] == b'!' && trimmed.as_bytes()[2].is_ascii_alphabetic()
    {
        return Some(HtmlEnd::Declaration);
    }

    // type 6: known block tag, open or closing
    let name_start = if lower.starts_with("</") { 2 } else { 1 };
    let name: String = lower[name_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if BLOCK_TAGS.contains(&name.as_str()) {
        let after = &lower[name_start + name.len()..];
        if after.is_empty()
            || after.starts_with([' ', '\t', '>'])
            || after.starts_with("/>")
        {
            return Some(HtmlEnd::BlankLine);
        }
    }

    // type 7: a complete tag alone on its line
    if !interrupting && !VERBATIM_TAGS.contains(&name.as_str()) {
        let end = if trimmed.starts_with("</") {
            scan::match_close_tag(trimmed, 0)
        } else {
            scan::match_open_tag(trimmed, 0)
        };
        if let Some(end) = end {
            if trimmed[end..].trim().is_empty() {
                return Some(HtmlEnd::BlankLine);
            }
        }
    }
    None
}

fn line_ends_block(line: &str, end: HtmlEnd) -> bool {
    let lower = line.to_ascii_lowercase();
    match end {
        HtmlEnd::VerbatimClose => VERBATIM_TAGS
            .iter()
            .any(|tag| lower.contains(&format!("</{tag}>"))),
        HtmlEnd::Comment => lower.contains("-->"),
        HtmlEnd::Instruction => lower.contains("?>"),
        HtmlEnd::Declaration => lower.contains('>'),
        HtmlEnd::Cdata => lower.contains("]]>"),
        HtmlEnd::BlankLine => scan::is_blank(line),
    }
}

/// Raw HTML blocks, passed through (or escaped) by the renderer.
pub struct HtmlBlock;

impl BlockRule for HtmlBlock {
    fn name(&self) -> &'static str {
        "html_block"
    }

    fn priority(&self) -> u8 {
        60
    }

    fn apply(&self, _parser: &BlockParser, state: &mut BlockState<'_>) -> Result<bool, Error> {
        let line = state.line();
        if scan::indent_width(line) > 3 {
            return Ok(false);
        }
        let trimmed = line.trim_start_matches([' ', '\t']);
        let Some(end) = start_condition(trimmed, state.has_open_paragraph()) else {
            return Ok(false);
        };

        let mut raw = String::new();
        while !state.eof() {
            let line = state.line();
            let ends = line_ends_block(line, end);
            if ends && end == HtmlEnd::BlankLine {
                break;
            }
            raw.push_str(line);
            raw.push('\n');
            state.advance_line();
            if ends {
                break;
            }
        }
        state.append(Token::text_leaf("block_html", raw));
        Ok(true)
    }
}
