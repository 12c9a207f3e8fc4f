//! AST shape and cross-cutting laws.

use runemark::render::render_ast;
use runemark::state::normalize_label;
use runemark::{Markdown, Options, RenderMode, Token};

#[test]
fn ast_mapping_shape() {
    let md = Markdown::new();
    let (tokens, _env) = md.parse("# Title\n\nBody *em*.").expect("parse");
    let value = render_ast(&tokens);

    assert_eq!(value[0]["type"], "heading");
    assert_eq!(value[0]["attrs"]["level"], 1);
    assert_eq!(value[0]["children"][0]["type"], "text");
    assert_eq!(value[1]["type"], "paragraph");
    let children = value[1]["children"].as_array().expect("children");
    assert!(children.iter().any(|c| c["type"] == "emphasis"));
}

#[test]
fn ast_mode_convert_is_json() {
    let md = Markdown::with_options(Options {
        renderer: RenderMode::Ast,
        ..Options::default()
    });
    let out = md.convert("- a\n- b").expect("convert");
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value[0]["type"], "list");
    assert_eq!(value[0]["attrs"]["tight"], true);
}

#[test]
fn render_after_parse_equals_convert() {
    let md = Markdown::gfm();
    let src = "# h\n\n| a |\n| --- |\n| 1 |\n\n- [x] done\n\ntext ~~old~~\n";
    let (tokens, env) = md.parse(src).expect("parse");
    assert_eq!(
        md.render_html(&tokens, &env).expect("render"),
        md.convert(src).expect("convert")
    );
}

#[test]
fn label_normalization_is_idempotent() {
    for label in ["Foo  Bar", "  baZ\tqux ", "ÄÖÜ", "a\nb"] {
        let once = normalize_label(label);
        assert_eq!(normalize_label(&once), once);
    }
}

#[test]
fn tightness_law() {
    let md = Markdown::new();

    let (tokens, _) = md.parse("- a\n- b").expect("parse");
    assert!(tokens[0].attr_flag("tight"));

    // an item with two blank-separated blocks makes the list loose
    let (tokens, _) = md.parse("- a\n\n  b\n- c").expect("parse");
    assert!(!tokens[0].attr_flag("tight"));
}

#[test]
fn no_nested_link_law() {
    fn assert_no_nested(token: &Token, inside_link: bool) {
        let is_link = token.kind == "link";
        assert!(!(is_link && inside_link), "nested link found");
        for child in token.children.as_deref().unwrap_or_default() {
            assert_no_nested(child, inside_link || is_link);
        }
    }

    let md = Markdown::gfm();
    let sources = [
        "[a [b](/inner) c](/outer)",
        "[x <https://auto.link> y](/u)",
        "[see www.example.com](/u)",
    ];
    for src in sources {
        let (tokens, _) = md.parse(src).expect("parse");
        for token in &tokens {
            assert_no_nested(token, false);
        }
    }
}

#[test]
fn escape_safety_law() {
    let inputs = [
        "<script>alert(1)</script>",
        "text <script>x</script> more",
        "[x](<javascript:alert(1)>)",
        "<img src=x onerror=alert(1)>",
    ];
    for input in inputs {
        let html = runemark::to_html(input);
        assert!(
            !html.contains("<script>") && !html.contains("javascript:"),
            "unsafe output for {input}: {html}"
        );
    }
}

#[test]
fn raw_field_preserves_source_of_inlined_leaves() {
    let md = Markdown::new();
    let (tokens, _) = md.parse("some *text* here").expect("parse");
    assert_eq!(tokens[0].raw.as_deref(), Some("some *text* here"));
    assert!(tokens[0].text.is_none());
    assert!(tokens[0].children.is_some());
}
