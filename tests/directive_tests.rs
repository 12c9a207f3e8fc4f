//! Directive subsystem tests.

use runemark::directive::{Admonition, Directives, Figure, Include, Toc};
use runemark::{Error, Markdown};

fn md() -> Markdown {
    Markdown::new().plugin(
        Directives::both()
            .with(Admonition)
            .with(Toc)
            .with(Figure),
    )
}

// --- admonitions ---

#[test]
fn rst_warning_admonition() {
    let html = md()
        .convert(".. warning::\n\n   be careful")
        .expect("convert");
    assert_eq!(
        html,
        "<section class=\"admonition warning\">\n<p>be careful</p>\n</section>\n"
    );
}

#[test]
fn all_admonition_names_register() {
    for name in [
        "attention",
        "caution",
        "danger",
        "error",
        "hint",
        "important",
        "note",
        "tip",
        "warning",
    ] {
        let src = format!(".. {name}::\n\n   body");
        let html = md().convert(&src).expect("convert");
        assert!(html.contains(&format!("admonition {name}")), "{name}");
    }
}

#[test]
fn admonition_title_and_nested_markdown() {
    let html = md()
        .convert(".. note:: Watch out\n\n   has `code` inside")
        .expect("convert");
    assert!(html.contains("<p class=\"admonition-title\">Watch out</p>"));
    assert!(html.contains("<code>code</code>"));
}

#[test]
fn fenced_admonition() {
    let html = md()
        .convert("```{note} Heads up\nfenced body\n```")
        .expect("convert");
    assert!(html.contains("admonition note"));
    assert!(html.contains("<p>fenced body</p>"));
}

#[test]
fn unknown_rst_directive_is_fatal() {
    let err = md().convert(".. nonesuch:: x").expect_err("fatal");
    assert!(matches!(err, Error::DirectiveNotRegistered(name) if name == "nonesuch"));
}

#[test]
fn text_after_directive_continues_normally() {
    let html = md()
        .convert(".. note::\n\n   inside\n\noutside")
        .expect("convert");
    assert!(html.contains("<p>inside</p>"));
    assert!(html.contains("</section>\n<p>outside</p>\n"));
}

// --- toc ---

#[test]
fn toc_builds_nested_list() {
    let html = md()
        .convert(".. toc::\n\n# A\n\n## B\n\n# C")
        .expect("convert");
    assert!(html.contains("<ul class=\"toc\">"));
    assert!(html.contains("<a href=\"#a\">A</a>"));
    assert!(html.contains("<a href=\"#b\">B</a>"));
    assert!(html.contains("<a href=\"#c\">C</a>"));
    // nested level opens an inner list
    assert!(html.contains("<ul>\n<li><a href=\"#b\">"), "{html}");
}

#[test]
fn toc_respects_max_level() {
    let html = md()
        .convert(".. toc::\n   :max-level: 1\n\n# A\n\n## B")
        .expect("convert");
    assert!(html.contains("href=\"#a\""));
    assert!(!html.contains("href=\"#b\""));
}

#[test]
fn toc_with_no_headings_is_empty_list() {
    let html = md().convert(".. toc::\n\nplain").expect("convert");
    assert!(html.contains("<ul class=\"toc\"></ul>"));
}

#[test]
fn headings_gain_ids_for_anchors() {
    let html = md().convert(".. toc::\n\n# Alpha Beta").expect("convert");
    assert!(html.contains("<h1 id=\"alpha-beta\">Alpha Beta</h1>"));
}

// --- figure ---

#[test]
fn image_directive() {
    let html = md()
        .convert(".. image:: /logo.png\n   :alt: Logo")
        .expect("convert");
    assert!(html.contains("<img src=\"/logo.png\" alt=\"Logo\" />"));
}

#[test]
fn figure_with_caption() {
    let html = md()
        .convert(".. figure:: /chart.png\n\n   Quarterly results.")
        .expect("convert");
    assert!(html.contains("<figure>"));
    assert!(html.contains("<figcaption>"));
    assert!(html.contains("Quarterly results."));
}

// --- include ---

#[test]
fn include_splices_parsed_content() {
    let md = Markdown::new().plugin(Directives::rst().with(Include::with_resolver(
        Box::new(|path, _| match path {
            "chapter.md" => Ok("## Chapter\n\ncontent".to_owned()),
            other => Err(format!("unknown file {other}")),
        }),
    )));
    let html = md
        .convert("# Book\n\n.. include:: chapter.md")
        .expect("convert");
    assert!(html.contains("<h1>Book</h1>"));
    assert!(html.contains("<h2>Chapter</h2>"));
    assert!(html.contains("<p>content</p>"));
}

#[test]
fn include_failure_renders_error_block() {
    let md = Markdown::new().plugin(
        Directives::rst().with(Include::with_resolver(Box::new(|_, _| {
            Err("denied".to_owned())
        }))),
    );
    let html = md.convert(".. include:: secret.md").expect("convert");
    assert!(html.contains("<div class=\"error\">"));
    assert!(html.contains("secret.md"));
    assert!(html.contains("denied"));
}

#[test]
fn include_shares_reference_map() {
    let md = Markdown::new().plugin(Directives::rst().with(Include::with_resolver(
        Box::new(|_, _| Ok("[linked]: /target".to_owned())),
    )));
    let html = md
        .convert(".. include:: refs.md\n\nsee [linked]")
        .expect("convert");
    assert!(html.contains("<a href=\"/target\">linked</a>"), "{html}");
}
