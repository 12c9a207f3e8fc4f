//! GFM strikethrough, task lists, and linkify.

use runemark::Markdown;

fn to_html(src: &str) -> String {
    Markdown::gfm().convert(src).expect("convert")
}

// --- strikethrough ---

#[test]
fn strikethrough_renders_del() {
    assert_eq!(to_html("~~old~~ new"), "<p><del>old</del> new</p>\n");
}

#[test]
fn single_tilde_is_not_strikethrough() {
    assert_eq!(to_html("~x~"), "<p>~x~</p>\n");
}

#[test]
fn strikethrough_combines_with_strong() {
    assert_eq!(
        to_html("~~**x**~~"),
        "<p><del><strong>x</strong></del></p>\n"
    );
}

// --- task lists ---

#[test]
fn task_list_items() {
    let html = to_html("- [ ] open\n- [x] done");
    assert!(html.contains("<li><input type=\"checkbox\" disabled> open</li>"));
    assert!(html.contains("<li><input type=\"checkbox\" disabled checked> done</li>"));
}

#[test]
fn task_marker_only_at_item_start() {
    let html = to_html("- see [x] later");
    assert!(!html.contains("checkbox"));
}

#[test]
fn nested_task_lists() {
    let html = to_html("- [ ] outer\n  - [x] inner");
    assert_eq!(html.matches("checkbox").count(), 2);
}

// --- linkify ---

#[test]
fn bare_url_is_linked() {
    let html = to_html("visit https://example.com/a today");
    assert!(html.contains("<a href=\"https://example.com/a\">https://example.com/a</a>"));
}

#[test]
fn www_url_is_linked() {
    let html = to_html("www.example.com rocks");
    assert!(html.contains("<a href=\"http://www.example.com\">www.example.com</a>"));
}

#[test]
fn trailing_punctuation_stays_outside() {
    let html = to_html("read https://example.com/doc, then reply");
    assert!(html.contains("doc</a>, then reply"));
}

#[test]
fn url_inside_angle_autolink_unaffected() {
    let html = to_html("<https://example.com>");
    assert_eq!(
        html,
        "<p><a href=\"https://example.com\">https://example.com</a></p>\n"
    );
}

// --- combined ---

#[test]
fn gfm_pipeline_handles_everything_at_once() {
    let src = "# Tasks\n\n- [x] ship ~~v1~~ v2\n- [ ] blog at www.example.com\n\n| col |\n| --- |\n| val |\n";
    let html = to_html(src);
    assert!(html.contains("checked"));
    assert!(html.contains("<del>v1</del>"));
    assert!(html.contains("http://www.example.com"));
    assert!(html.contains("<td>val</td>"));
}
