use crate::attrs::{self, AttrName, AttrValue};
use crate::surface::{NativeEvent, Surface};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What to extract from a fired event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ArgSpec {
    /// Reference to the bound widget itself (`"self"`).
    SelfRef,
    /// The raw event (`"ev"` or `"event"`).
    Event,
    /// Attribute read from the event's originating node.
    Attribute(String),
}

impl From<&str> for ArgSpec {
    fn from(spec: &str) -> Self {
        match spec {
            "self" => ArgSpec::SelfRef,
            "ev" | "event" => ArgSpec::Event,
            name => ArgSpec::Attribute(name.to_string()),
        }
    }
}

impl From<String> for ArgSpec {
    fn from(spec: String) -> Self {
        ArgSpec::from(spec.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSnapshot {
    pub name: String,
    pub detail: serde_json::Value,
}

/// One resolved argument of a host notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    Widget(String),
    Event(EventSnapshot),
    Attribute(AttrValue),
}

/// A listener installed for (widget, event, binding name).
#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub widget_id: String,
    pub event: String,
    pub binding: String,
    pub args: Vec<ArgSpec>,
    /// Id reported to the host; the bound widget when absent.
    pub remote_id: Option<String>,
}

impl EventBinding {
    pub fn new(widget_id: &str, event: &str, binding: &str) -> Self {
        Self {
            widget_id: widget_id.to_string(),
            event: event.to_string(),
            binding: binding.to_string(),
            args: Vec::new(),
            remote_id: None,
        }
    }

    pub fn with_args(mut self, args: Vec<ArgSpec>) -> Self {
        self.args = args;
        self
    }

    pub fn with_remote_id(mut self, remote_id: Option<String>) -> Self {
        self.remote_id = remote_id;
        self
    }

    pub fn remote_id(&self) -> &str {
        self.remote_id.as_deref().unwrap_or(&self.widget_id)
    }
}

/// Build the argument list for a fired event. Reads the surface, never mutates it.
pub fn resolve_args<S: Surface>(
    binding: &EventBinding,
    event: &NativeEvent<S::Node>,
    surface: &S,
) -> Vec<ArgValue> {
    binding
        .args
        .iter()
        .map(|spec| match spec {
            ArgSpec::SelfRef => ArgValue::Widget(binding.widget_id.clone()),
            ArgSpec::Event => ArgValue::Event(EventSnapshot {
                name: event.name.clone(),
                detail: event.detail.clone(),
            }),
            ArgSpec::Attribute(name) => {
                let value = attrs::read(surface, &event.target, AttrName::parse(name));
                trace!(attribute = %name, ?value, "resolved event argument");
                ArgValue::Attribute(value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use serde_json::json;

    #[test]
    fn test_arg_spec_parsing() {
        assert_eq!(ArgSpec::from("self"), ArgSpec::SelfRef);
        assert_eq!(ArgSpec::from("ev"), ArgSpec::Event);
        assert_eq!(ArgSpec::from("event"), ArgSpec::Event);
        assert_eq!(ArgSpec::from("value"), ArgSpec::Attribute("value".into()));
    }

    #[test]
    fn test_resolve_args_in_order() {
        let mut surface = MemorySurface::new();
        let input = surface.create_element("input").unwrap();
        surface.set_value(&input, "42");

        let binding = EventBinding::new("field", "change", "on_change").with_args(vec![
            "value".into(),
            "self".into(),
            "event".into(),
        ]);
        let event = NativeEvent::new("change", input).with_detail(json!({ "key": "Enter" }));

        let args = resolve_args(&binding, &event, &surface);
        assert_eq!(
            args,
            vec![
                ArgValue::Attribute(AttrValue::text("42")),
                ArgValue::Widget("field".into()),
                ArgValue::Event(EventSnapshot {
                    name: "change".into(),
                    detail: json!({ "key": "Enter" }),
                }),
            ]
        );
    }

    #[test]
    fn test_attribute_read_from_event_target() {
        let mut surface = MemorySurface::new();
        let outer = surface.create_element("div").unwrap();
        let inner = surface.create_element("input").unwrap();
        surface.set_value(&outer, "outer");
        surface.set_value(&inner, "inner");

        let binding = EventBinding::new("composite", "input", "typed").with_args(vec!["value".into()]);
        let args = resolve_args(&binding, &NativeEvent::new("input", inner), &surface);

        assert_eq!(args, vec![ArgValue::Attribute(AttrValue::text("inner"))]);
    }

    #[test]
    fn test_remote_id_defaults_to_widget() {
        let binding = EventBinding::new("btn", "click", "pressed");
        assert_eq!(binding.remote_id(), "btn");

        let forwarded = binding.with_remote_id(Some("dialog".into()));
        assert_eq!(forwarded.remote_id(), "dialog");
    }

    #[test]
    fn test_arg_value_wire_shape() {
        let value = serde_json::to_value(ArgValue::Widget("btn".into())).unwrap();
        assert_eq!(value, json!({ "kind": "widget", "value": "btn" }));
    }
}
