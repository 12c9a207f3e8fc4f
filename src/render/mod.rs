//! Renderers: HTML with method dispatch, and the mechanical AST form.

pub mod ast;
pub mod html;

pub use ast::render_ast;
pub use html::{HtmlContext, HtmlRenderer, RenderFn, RenderOptions};
