//! AST renderer.
//!
//! Tokens serialize mechanically to the
//! `{type, raw?, text?, children?, attrs?}` mapping shape.

use serde_json::Value;

use crate::token::Token;

/// Render the token tree as a JSON value.
pub fn render_ast(tokens: &[Token]) -> Value {
    serde_json::to_value(tokens).unwrap_or(Value::Null)
}
