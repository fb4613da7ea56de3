use super::style::StyleDescriptor;
use serde::{Deserialize, Serialize};

/// Attribute value as exchanged with the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Style(Box<StyleDescriptor>),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    /// String form used for text-like targets. `None` for style descriptors.
    pub fn as_dom_string(&self) -> Option<String> {
        match self {
            AttrValue::Null => Some(String::new()),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Style(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Option<String>> for AttrValue {
    fn from(value: Option<String>) -> Self {
        value.map(AttrValue::Text).unwrap_or(AttrValue::Null)
    }
}

impl From<StyleDescriptor> for AttrValue {
    fn from(value: StyleDescriptor) -> Self {
        AttrValue::Style(Box::new(value))
    }
}
