//! GFM task-list items.

use crate::error::Error;
use crate::markdown::{Markdown, PassContext, PassStage};
use crate::plugin::Plugin;
use crate::state::Env;
use crate::token::Token;

/// `[ ]` / `[x]` checkbox markers at the start of list items.
///
/// Runs before the inline phase so the marker is stripped from the raw
/// paragraph text; the list-item renderer emits the checkbox from the
/// `checked` attribute.
pub struct TaskList;

impl Plugin for TaskList {
    fn name(&self) -> &'static str {
        "task_list"
    }

    fn setup(&self, md: &mut Markdown) {
        md.tree_pass("task_list", PassStage::BeforeInline, Box::new(mark_tasks));
    }
}

fn mark_tasks(
    _ctx: &PassContext<'_>,
    tokens: &mut Vec<Token>,
    _env: &mut Env,
) -> Result<(), Error> {
    walk(tokens);
    Ok(())
}

fn walk(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        if token.kind == "list_item" {
            mark_item(token);
        }
        if let Some(children) = token.children.as_mut() {
            walk(children);
        }
    }
}

fn mark_item(item: &mut Token) {
    let Some(first) = item.children.as_mut().and_then(|c| c.first_mut()) else {
        return;
    };
    if first.kind != "paragraph" {
        return;
    }
    let Some(text) = first.text.as_mut() else {
        return;
    };
    let checked = match text.get(..4) {
        Some("[ ] ") => false,
        Some("[x] ") | Some("[X] ") => true,
        _ => match text.as_str() {
            "[ ]" => false,
            "[x]" | "[X]" => true,
            _ => return,
        },
    };
    let rest = text.get(4..).unwrap_or("").to_owned();
    *text = rest;
    item.set_attr("checked", checked);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_html(src: &str) -> String {
        Markdown::new()
            .plugin(TaskList)
            .convert(src)
            .expect("convert")
    }

    #[test]
    fn unchecked_item() {
        let html = to_html("- [ ] todo");
        assert!(html.contains("<input type=\"checkbox\" disabled> todo"));
    }

    #[test]
    fn checked_item() {
        let html = to_html("- [x] done");
        assert!(html.contains("<input type=\"checkbox\" disabled checked> done"));
    }

    #[test]
    fn plain_items_untouched() {
        let html = to_html("- plain");
        assert!(!html.contains("checkbox"));
    }

    #[test]
    fn marker_must_lead_the_item() {
        let html = to_html("- not [x] a task");
        assert!(!html.contains("checkbox"));
    }
}
