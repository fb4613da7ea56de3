//! Attribute marshaling between host values and surface properties.
//!
//! Most names are plain attributes, but `text`, `value`, `checked` and `style` are first-class
//! properties on the surface. [`AttrName`] enumerates the special cases; everything else takes
//! the [`AttrName::Plain`] path.

mod style;
mod value;

pub use style::{Border, Edges, Pixels, StyleDescriptor, read_style, write_style};
pub(crate) use style::parse_declarations;
pub use value::AttrValue;

use crate::error::{BridgeError, Result};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrName<'a> {
    /// Re-keys the widget. Only the surface-side write lives here; the bridge migrates its
    /// tables before calling [`write`].
    Id,
    Text,
    Value,
    Checked,
    Style,
    Plain(&'a str),
}

impl<'a> AttrName<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name {
            "id" => AttrName::Id,
            "text" => AttrName::Text,
            "value" => AttrName::Value,
            "checked" => AttrName::Checked,
            "style" => AttrName::Style,
            other => AttrName::Plain(other),
        }
    }

    /// Name of the underlying surface attribute for remove/exists.
    pub fn attribute(self) -> &'a str {
        match self {
            AttrName::Id => "id",
            AttrName::Text => "text",
            AttrName::Value => "value",
            AttrName::Checked => "checked",
            AttrName::Style => "style",
            AttrName::Plain(name) => name,
        }
    }
}

pub fn read<S: Surface>(surface: &S, node: &S::Node, name: AttrName<'_>) -> AttrValue {
    match name {
        AttrName::Text => AttrValue::Text(surface.text(node)),
        AttrName::Value => AttrValue::Text(surface.value(node)),
        AttrName::Checked => AttrValue::Bool(surface.checked(node)),
        AttrName::Style => read_style(surface, node).into(),
        AttrName::Id | AttrName::Plain(_) => surface.attribute(node, name.attribute()).into(),
    }
}

pub fn write<S: Surface>(
    surface: &mut S,
    node: &S::Node,
    name: AttrName<'_>,
    value: &AttrValue,
) -> Result<()> {
    match (name, value) {
        (AttrName::Style, AttrValue::Style(style)) => write_style(surface, node, style),
        (AttrName::Checked, AttrValue::Bool(checked)) => surface.set_checked(node, *checked),
        (AttrName::Checked, AttrValue::Null) => surface.set_checked(node, false),
        (AttrName::Style | AttrName::Checked, _) => {
            return Err(invalid(name, "unexpected value type"));
        }
        (_, value) => {
            let text = value
                .as_dom_string()
                .ok_or_else(|| invalid(name, "style descriptors only apply to `style`"))?;
            match name {
                AttrName::Text => surface.set_text(node, &text),
                AttrName::Value => surface.set_value(node, &text),
                _ => surface.set_attribute(node, name.attribute(), &text),
            }
        }
    }
    Ok(())
}

pub fn remove<S: Surface>(surface: &mut S, node: &S::Node, name: AttrName<'_>) {
    surface.remove_attribute(node, name.attribute());
}

pub fn exists<S: Surface>(surface: &S, node: &S::Node, name: AttrName<'_>) -> bool {
    surface.has_attribute(node, name.attribute())
}

fn invalid(name: AttrName<'_>, reason: &str) -> BridgeError {
    BridgeError::InvalidValue {
        name: name.attribute().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    #[test]
    fn test_parse_special_names() {
        assert_eq!(AttrName::parse("text"), AttrName::Text);
        assert_eq!(AttrName::parse("style"), AttrName::Style);
        assert_eq!(AttrName::parse("placeholder"), AttrName::Plain("placeholder"));
    }

    #[test]
    fn test_text_is_content_not_attribute() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("span").unwrap();

        write(&mut surface, &node, AttrName::Text, &"hi".into()).unwrap();

        assert_eq!(read(&surface, &node, AttrName::Text), AttrValue::text("hi"));
        assert!(!exists(&surface, &node, AttrName::Text));
    }

    #[test]
    fn test_checked_round_trip() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("input").unwrap();

        write(&mut surface, &node, AttrName::Checked, &true.into()).unwrap();
        assert_eq!(read(&surface, &node, AttrName::Checked), AttrValue::Bool(true));
    }

    #[test]
    fn test_checked_rejects_text() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("input").unwrap();

        let err = write(&mut surface, &node, AttrName::Checked, &"yes".into()).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidValue { .. }));
    }

    #[test]
    fn test_plain_attribute_lifecycle() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("input").unwrap();
        let name = AttrName::parse("placeholder");

        assert_eq!(read(&surface, &node, name), AttrValue::Null);
        write(&mut surface, &node, name, &"type here".into()).unwrap();
        assert!(exists(&surface, &node, name));
        assert_eq!(read(&surface, &node, name), AttrValue::text("type here"));

        remove(&mut surface, &node, name);
        assert!(!exists(&surface, &node, name));
    }

    #[test]
    fn test_numbers_and_bools_stringify() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("input").unwrap();

        write(
            &mut surface,
            &node,
            AttrName::Plain("maxlength"),
            &AttrValue::Number(serde_json::Number::from(12u32)),
        )
        .unwrap();
        write(&mut surface, &node, AttrName::Plain("disabled"), &true.into()).unwrap();

        assert_eq!(surface.attribute(&node, "maxlength").as_deref(), Some("12"));
        assert_eq!(surface.attribute(&node, "disabled").as_deref(), Some("true"));
    }

    #[test]
    fn test_style_descriptor_outside_style_rejected() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("div").unwrap();

        let result = write(
            &mut surface,
            &node,
            AttrName::Text,
            &StyleDescriptor::default().into(),
        );
        assert!(result.is_err());
    }
}
