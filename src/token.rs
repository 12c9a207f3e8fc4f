//! The token tree produced by the block and inline phases.
//!
//! A token is either a leaf or a container. A *raw leaf* carries `text`
//! that the inline phase has not consumed yet; after the inline walk the
//! text moves to `raw` and `children` holds the parsed inline tokens.
//! Serialization yields the `{type, raw?, text?, children?, attrs?}`
//! mapping shape used by the AST renderer and the test suite.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

/// Attribute map attached to a token.
///
/// Keys are attribute names (`level`, `url`, `title`, `info`, `ordered`,
/// `start`, `tight`, `align`, `label`, `ref`, …); plugins may add their
/// own. A `BTreeMap` keeps serialization deterministic.
pub type AttrMap = BTreeMap<Cow<'static, str>, AttrValue>;

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag (`ordered`, `tight`, `checked`).
    Bool(bool),
    /// Integer (`level`, `start`).
    Int(i64),
    /// String (`url`, `title`, `info`, `align`).
    Str(String),
    /// Ordered collection (table alignment list, TOC entries).
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// The value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

fn attrs_empty(attrs: &AttrMap) -> bool {
    attrs.is_empty()
}

/// A node in the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// Kind identifier (`paragraph`, `heading`, `text`, `emphasis`, …).
    #[serde(rename = "type")]
    pub kind: Cow<'static, str>,
    /// Original source slice, where preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Leaf text. On a raw leaf this is pending inline input; on inline
    /// leaves (`text`, `codespan`) it is the final content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child tokens, present on containers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Token>>,
    /// Attributes.
    #[serde(skip_serializing_if = "attrs_empty")]
    pub attrs: AttrMap,
}

impl Token {
    /// Create an empty token of the given kind.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            raw: None,
            text: None,
            children: None,
            attrs: AttrMap::new(),
        }
    }

    /// Create a leaf carrying final text (e.g. a `text` token).
    pub fn text_leaf(kind: impl Into<Cow<'static, str>>, text: impl Into<String>) -> Self {
        let mut token = Self::new(kind);
        token.text = Some(text.into());
        token
    }

    /// Create a container with the given children.
    pub fn container(kind: impl Into<Cow<'static, str>>, children: Vec<Token>) -> Self {
        let mut token = Self::new(kind);
        token.children = Some(children);
        token
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &'static str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(Cow::Borrowed(name), value.into());
        self
    }

    /// Set an attribute in place.
    pub fn set_attr(&mut self, name: &'static str, value: impl Into<AttrValue>) {
        self.attrs.insert(Cow::Borrowed(name), value.into());
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// String attribute shortcut.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    /// Integer attribute shortcut.
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(AttrValue::as_int)
    }

    /// Boolean attribute shortcut; absent means `false`.
    pub fn attr_flag(&self, name: &str) -> bool {
        self.attr(name).and_then(AttrValue::as_bool).unwrap_or(false)
    }

    /// Whether this token still carries un-inlined text.
    pub fn is_raw_leaf(&self) -> bool {
        self.text.is_some() && self.children.is_none()
    }

    /// Append a child, creating the child list if needed.
    pub fn push_child(&mut self, child: Token) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Concatenate the visible text of this subtree into `out`.
    ///
    /// Used for heading slugs and TOC entries.
    pub fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        if let Some(children) = &self.children {
            for child in children {
                child.collect_text(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_shape() {
        let token = Token::text_leaf("text", "hi").with_attr("level", 2i64);
        assert_eq!(token.kind, "text");
        assert_eq!(token.text.as_deref(), Some("hi"));
        assert_eq!(token.attr_int("level"), Some(2));
        assert!(token.is_raw_leaf());
    }

    #[test]
    fn serializes_to_mapping_shape() {
        let token = Token::container(
            "heading",
            vec![Token::text_leaf("text", "hello")],
        )
        .with_attr("level", 1i64);

        let value = serde_json::to_value(&token).expect("token serializes");
        assert_eq!(value["type"], "heading");
        assert_eq!(value["attrs"]["level"], 1);
        assert_eq!(value["children"][0]["text"], "hello");
        // absent fields stay absent
        assert!(value.get("raw").is_none());
    }

    #[test]
    fn collect_text_walks_subtree() {
        let token = Token::container(
            "paragraph",
            vec![
                Token::text_leaf("text", "a "),
                Token::container("emphasis", vec![Token::text_leaf("text", "b")]),
            ],
        );
        let mut out = String::new();
        token.collect_text(&mut out);
        assert_eq!(out, "a b");
    }
}
