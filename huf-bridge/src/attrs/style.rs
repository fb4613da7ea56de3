use crate::surface::Surface;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Shorthands and the longhands written through per-property assignments. None of these are
/// reported as flat properties on read; their values surface through the composite groups.
const COMPOSITE_PROPERTIES: &[&str] = &[
    "border",
    "border-width",
    "border-style",
    "border-color",
    "border-radius",
    "margin",
    "margin-left",
    "margin-right",
    "margin-top",
    "margin-bottom",
    "padding",
    "padding-left",
    "padding-right",
    "padding-top",
    "padding-bottom",
];

fn is_composite(property: &str) -> bool {
    COMPOSITE_PROPERTIES.contains(&property)
}

/// A pixel length inside a composite group.
///
/// Serializes as a bare number, or as `""` when the property is not set on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pixels {
    #[default]
    Unset,
    Px(i64),
}

impl Pixels {
    /// Reads a CSS length the way `parseInt` would: leading integer digits, unit ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let digits = raw.strip_suffix("px").unwrap_or(raw);
        let end = digits
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(digits.len());
        match digits[..end].parse::<i64>() {
            Ok(n) => Pixels::Px(n),
            Err(_) => Pixels::Unset,
        }
    }

    fn css(self) -> Option<String> {
        match self {
            Pixels::Unset => None,
            Pixels::Px(n) => Some(format!("{n}px")),
        }
    }
}

impl From<i64> for Pixels {
    fn from(n: i64) -> Self {
        Pixels::Px(n)
    }
}

impl Serialize for Pixels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Pixels::Unset => serializer.serialize_str(""),
            Pixels::Px(n) => serializer.serialize_i64(*n),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPixels {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Pixels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawPixels>::deserialize(deserializer)? {
            None => Ok(Pixels::Unset),
            Some(RawPixels::Int(n)) => Ok(Pixels::Px(n)),
            Some(RawPixels::Float(n)) => Ok(Pixels::Px(n.trunc() as i64)),
            Some(RawPixels::Text(s)) if s.trim().is_empty() => Ok(Pixels::Unset),
            Some(RawPixels::Text(s)) => match Pixels::parse(&s) {
                Pixels::Unset => Err(serde::de::Error::custom(format!(
                    "expected a pixel length, got `{s}`"
                ))),
                px => Ok(px),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    pub width: Pixels,
    pub style: String,
    pub color: String,
    pub radius: Pixels,
}

/// Margin or padding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub left: Pixels,
    pub right: Pixels,
    pub top: Pixels,
    pub bottom: Pixels,
}

impl Edges {
    fn sides(&self) -> [(&'static str, Pixels); 4] {
        [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
        ]
    }
}

/// Structured view of a node's inline style.
///
/// Writes skip unset composite fields, so the output of [`read_style`] can be fed straight
/// back into [`write_style`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDescriptor {
    pub border: Border,
    pub margin: Edges,
    pub padding: Edges,
    /// Flat CSS properties. Hosts may send numbers or booleans; they are kept in CSS text form.
    #[serde(flatten, deserialize_with = "scalar_properties")]
    pub properties: BTreeMap<String, String>,
}

fn scalar_properties<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut properties = BTreeMap::new();
    for (key, value) in raw {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "style property `{key}` must be a scalar, got `{other}`"
                )));
            }
        };
        properties.insert(key, text);
    }
    Ok(properties)
}

impl StyleDescriptor {
    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }
}

/// Split an inline style string into `(property, value)` pairs.
pub(crate) fn parse_declarations(raw: &str) -> impl Iterator<Item = (&str, &str)> {
    raw.split(';').filter_map(|item| {
        let (key, value) = item.split_once(':')?;
        let key = key.trim();
        (!key.is_empty()).then(|| (key, value.trim()))
    })
}

pub fn read_style<S: Surface>(surface: &S, node: &S::Node) -> StyleDescriptor {
    let mut properties = BTreeMap::new();
    if let Some(raw) = surface.attribute(node, "style") {
        for (key, value) in parse_declarations(&raw) {
            if !is_composite(key) {
                properties.insert(key.to_string(), value.to_string());
            }
        }
    }

    // Explicit inline sizes win over measured ones; a zero measurement reads as `""`.
    let (width, height) = surface.client_size(node);
    for (name, measured) in [("width", width), ("height", height)] {
        let entry = properties.entry(name.to_string());
        if measured == 0 {
            entry.or_default();
        } else {
            entry.or_insert_with(|| format!("{measured}px"));
        }
    }

    StyleDescriptor {
        border: Border {
            width: Pixels::parse(&surface.style_property(node, "border-width")),
            style: surface.style_property(node, "border-style"),
            color: surface.style_property(node, "border-color"),
            radius: Pixels::parse(&surface.style_property(node, "border-radius")),
        },
        margin: read_edges(surface, node, "margin"),
        padding: read_edges(surface, node, "padding"),
        properties,
    }
}

fn read_edges<S: Surface>(surface: &S, node: &S::Node, group: &str) -> Edges {
    let side = |name: &str| Pixels::parse(&surface.style_property(node, &format!("{group}-{name}")));
    Edges {
        left: side("left"),
        right: side("right"),
        top: side("top"),
        bottom: side("bottom"),
    }
}

/// Replaces the node's inline style with `style`. Empty values are the unset sentinel and
/// are skipped.
pub fn write_style<S: Surface>(surface: &mut S, node: &S::Node, style: &StyleDescriptor) {
    let inline: String = style
        .properties
        .iter()
        .filter(|(key, value)| {
            !value.is_empty() && !matches!(key.as_str(), "border" | "margin" | "padding")
        })
        .map(|(key, value)| format!("{key}:{value};"))
        .collect();
    surface.set_attribute(node, "style", &inline);

    let border = &style.border;
    if let Some(width) = border.width.css() {
        surface.set_style_property(node, "border-width", &width);
    }
    if !border.style.is_empty() {
        surface.set_style_property(node, "border-style", &border.style);
    }
    if !border.color.is_empty() {
        surface.set_style_property(node, "border-color", &border.color);
    }
    if let Some(radius) = border.radius.css() {
        surface.set_style_property(node, "border-radius", &radius);
    }

    for (group, edges) in [("margin", &style.margin), ("padding", &style.padding)] {
        for (side, px) in edges.sides() {
            if let Some(value) = px.css() {
                surface.set_style_property(node, &format!("{group}-{side}"), &value);
            }
        }
    }
}
