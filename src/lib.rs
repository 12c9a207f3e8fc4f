//! runemark: a CommonMark + GFM Markdown parser with pluggable rules,
//! directives, and HTML/AST renderers.
//!
//! The pipeline has two phases. The block phase tokenizes the document
//! into a tree of typed block tokens using a prioritized rule list and
//! accumulates the link reference map. The inline phase walks each raw
//! leaf, emitting inline tokens through a trigger-table scan plus a
//! delimiter-run processor for nested emphasis. Rendering dispatches
//! each token kind to a registered method, so plugins can introduce
//! new kinds end to end.
//!
//! # Example
//! ```
//! let html = runemark::to_html("# Hello *world*");
//! assert_eq!(html, "<h1>Hello <em>world</em></h1>\n");
//! ```

pub mod block;
pub mod directive;
pub mod error;
pub mod escape;
pub mod inline;
pub mod limits;
pub mod markdown;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod scan;
pub mod state;
pub mod token;

pub use error::Error;
pub use markdown::{Markdown, Options, PassContext, PassStage, RenderMode, TreePass};
pub use plugin::Plugin;
pub use render::{HtmlRenderer, RenderOptions};
pub use state::{BlockState, Env, InlineState};
pub use token::{AttrValue, Token};

/// Convert Markdown to HTML with the core CommonMark pipeline and
/// default options.
pub fn to_html(src: &str) -> String {
    Markdown::new()
        .convert(src)
        .expect("core pipeline has renderer methods for every core token kind")
}

/// Convert Markdown to HTML with explicit options.
pub fn to_html_with_options(src: &str, options: &Options) -> String {
    Markdown::with_options(options.clone())
        .convert(src)
        .expect("core pipeline has renderer methods for every core token kind")
}
