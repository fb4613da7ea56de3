use crate::attrs::{self, AttrName, AttrValue, read_style, write_style};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::events::{ArgSpec, EventBinding, EventTable, HostCall, HostLink, resolve_args};
use crate::registry::{WidgetKind, WidgetRegistry};
use crate::stylesheet::StyleSheetIndex;
use crate::surface::{Anchor, ListenerId, NativeEvent, Surface};
use crate::visibility::{self, TreeOutcome};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Everything the host sends to construct a widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    pub tag: String,
    #[serde(default, rename = "class")]
    pub class_name: String,
    pub kind: WidgetKind,
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    /// Defaults to the root container.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub auto_attach: bool,
}

impl WidgetSpec {
    pub fn new(tag: &str, kind: WidgetKind, id: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class_name: String::new(),
            kind,
            id: id.to_string(),
            attributes: BTreeMap::new(),
            parent_id: None,
            auto_attach: false,
        }
    }

    pub fn layout(tag: &str, id: &str) -> Self {
        Self::new(tag, WidgetKind::Layout, id)
    }

    pub fn widget(tag: &str, id: &str) -> Self {
        Self::new(tag, WidgetKind::Widget, id)
    }

    pub fn class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    pub fn attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn auto_attach(mut self, auto_attach: bool) -> Self {
        self.auto_attach = auto_attach;
        self
    }
}

/// Executes host commands against a surface and reports bound events back to the host.
///
/// Owns the widget registry, the event table and the style-sheet index; nothing else
/// mutates them.
pub struct Bridge<S: Surface, H: HostLink> {
    config: BridgeConfig,
    surface: S,
    host: H,
    registry: WidgetRegistry<S::Node>,
    events: EventTable,
    style_sheets: StyleSheetIndex,
}

impl<S: Surface, H: HostLink> Bridge<S, H> {
    pub fn new(surface: S, host: H) -> Self {
        Self::with_config(BridgeConfig::default(), surface, host)
    }

    pub fn with_config(config: BridgeConfig, surface: S, host: H) -> Self {
        Self {
            config,
            surface,
            host,
            registry: WidgetRegistry::new(),
            events: EventTable::new(),
            style_sheets: StyleSheetIndex::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn events(&self) -> &EventTable {
        &self.events
    }

    pub fn style_sheets(&self) -> &StyleSheetIndex {
        &self.style_sheets
    }

    /// Node registered under `id`.
    pub fn node(&self, id: &str) -> Option<&S::Node> {
        self.registry.get(id)
    }

    /// Registered widget ids, sorted.
    pub fn widget_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    pub fn widget_count(&self) -> usize {
        self.registry.len()
    }

    fn widget_node(&self, id: &str) -> Result<S::Node> {
        self.registry
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::UnknownWidget(id.to_string()))
    }

    /// Resolve a parent id to a node, flagging the reserved anchors.
    fn resolve_parent(&self, parent_id: &str) -> Option<(S::Node, bool)> {
        if self.config.is_body(parent_id) {
            self.surface.anchor(Anchor::Body).map(|n| (n, true))
        } else if self.config.is_root_container(parent_id) {
            self.surface.anchor(Anchor::Root).map(|n| (n, true))
        } else {
            self.registry.get(parent_id).map(|n| (n.clone(), false))
        }
    }

    /// Drop a node that lost its registry entry to another node under the same id.
    fn discard_displaced(&mut self, id: &str, displaced: &S::Node) {
        warn!(widget = %id, "widget id reused, discarding previous node");
        for (event, listener) in self.events.drop_widget(id) {
            self.surface.remove_listener(displaced, &event, listener);
        }
        self.surface.remove(displaced);
    }

    pub fn create(&mut self, spec: &WidgetSpec) -> Result<()> {
        let parent_id = spec
            .parent_id
            .clone()
            .unwrap_or_else(|| self.config.root_container_id.clone());
        let (parent, anchored) = self
            .resolve_parent(&parent_id)
            .ok_or_else(|| BridgeError::UnknownParent(parent_id.clone()))?;
        let under_root = self.config.is_root_container(&parent_id);
        if spec.kind == WidgetKind::Widget && under_root {
            return Err(BridgeError::WidgetNeedsLayout(spec.id.clone()));
        }

        let node = self.surface.create_element(&spec.tag)?;
        self.surface.set_class_name(&node, &spec.class_name);
        self.surface.set_attribute(&node, "id", &spec.id);
        for (name, value) in &spec.attributes {
            let name = AttrName::parse(name);
            if name == AttrName::Id {
                warn!(widget = %spec.id, "ignoring `id` in create attributes");
                continue;
            }
            attrs::write(&mut self.surface, &node, name, value)?;
        }
        if spec.kind == WidgetKind::Layout && under_root {
            self.surface.set_style_property(&node, "width", "100%");
            self.surface.set_style_property(&node, "height", "100%");
        }

        if let Some(displaced) = self.registry.insert(&spec.id, node.clone()) {
            self.discard_displaced(&spec.id, &displaced);
        }

        let attached = anchored || spec.auto_attach;
        if attached {
            if let Err(e) = self.surface.append_child(&parent, &node) {
                warn!(widget = %spec.id, error = %e, "initial attach failed");
            }
        }
        debug!(widget = %spec.id, tag = %spec.tag, parent = %parent_id, attached, "created widget");
        Ok(())
    }

    /// Remove a widget from the tree and the registry. Unknown ids are ignored.
    pub fn destroy(&mut self, id: &str) {
        let Some(node) = self.registry.remove(id) else {
            debug!(widget = %id, "destroy of unknown widget ignored");
            return;
        };
        for (event, listener) in self.events.drop_widget(id) {
            self.surface.remove_listener(&node, &event, listener);
        }
        self.surface.remove(&node);
        debug!(widget = %id, "destroyed widget");
    }

    pub fn get_attribute(&self, id: &str, name: &str) -> Result<AttrValue> {
        let node = self.widget_node(id)?;
        Ok(attrs::read(&self.surface, &node, AttrName::parse(name)))
    }

    pub fn set_attribute(&mut self, id: &str, name: &str, value: &AttrValue) -> Result<()> {
        let node = self.widget_node(id)?;
        let name = AttrName::parse(name);
        if name == AttrName::Id {
            let new_id = value
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| BridgeError::InvalidValue {
                    name: "id".into(),
                    reason: "expected a non-empty string".into(),
                })?;
            return self.rename(id, new_id);
        }
        attrs::write(&mut self.surface, &node, name, value)?;
        debug!(widget = %id, attribute = name.attribute(), "set attribute");
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: &str, name: &str) -> Result<()> {
        let node = self.widget_node(id)?;
        attrs::remove(&mut self.surface, &node, AttrName::parse(name));
        Ok(())
    }

    pub fn attribute_exists(&self, id: &str, name: &str) -> Result<bool> {
        let node = self.widget_node(id)?;
        Ok(attrs::exists(&self.surface, &node, AttrName::parse(name)))
    }

    /// Re-key a widget across the registry, the event table and its style sheet.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let displaced = self
            .registry
            .rename(from, to)
            .ok_or_else(|| BridgeError::UnknownWidget(from.to_string()))?;
        if let Some(displaced) = displaced {
            self.discard_displaced(to, &displaced);
        }
        let moved = self.events.rename_widget(from, to);
        let node = self.widget_node(to)?;
        self.surface.set_attribute(&node, "id", to);

        let old_sheet = self.config.style_sheet_id(from);
        let new_sheet = self.config.style_sheet_id(to);
        let sheet_renamed = self.style_sheets.contains(&old_sheet);
        if sheet_renamed {
            if self.style_sheets.remove(&new_sheet) {
                self.surface.remove_style_sheet(&new_sheet);
            }
            self.style_sheets.rename(&old_sheet, &new_sheet);
            self.surface.rename_style_sheet(&old_sheet, &new_sheet);
        }
        debug!(from, to, bindings = moved, sheet_renamed, "renamed widget");
        Ok(())
    }

    /// Hide (`detach`) or show (`attach`) a widget under `parent_id`.
    pub fn set_visible(&mut self, id: &str, parent_id: &str, visible: bool, index: Option<usize>) {
        let outcome = if visible {
            self.attach(id, parent_id, index)
        } else {
            self.detach(id, parent_id)
        };
        debug!(widget = %id, parent = %parent_id, visible, ?outcome, "set visible");
    }

    pub fn detach(&mut self, id: &str, parent_id: &str) -> TreeOutcome {
        let Some(node) = self.registry.get(id).cloned() else {
            return TreeOutcome::NotApplicable;
        };
        let parent = self.resolve_parent(parent_id).map(|(p, _)| p);
        visibility::detach(
            &mut self.surface,
            &node,
            parent.as_ref(),
            &self.config.visibility_attribute,
        )
    }

    pub fn attach(&mut self, id: &str, parent_id: &str, index: Option<usize>) -> TreeOutcome {
        let Some(node) = self.registry.get(id).cloned() else {
            return TreeOutcome::NotApplicable;
        };
        let Some((parent, _)) = self.resolve_parent(parent_id) else {
            return TreeOutcome::NotApplicable;
        };
        visibility::attach(
            &mut self.surface,
            &node,
            &parent,
            index,
            &self.config.visibility_attribute,
        )
    }

    /// Install (or replace) the listener for `(id, event, binding)`.
    pub fn bind(
        &mut self,
        id: &str,
        event: &str,
        binding: &str,
        args: Vec<ArgSpec>,
        remote_id: Option<String>,
    ) -> Result<ListenerId> {
        let node = self.widget_node(id)?;
        let record = EventBinding::new(id, event, binding)
            .with_args(args)
            .with_remote_id(remote_id);
        let (listener, replaced) = self.events.install(record);
        if let Some(old) = replaced {
            self.surface.remove_listener(&node, event, old);
        }
        self.surface.add_listener(&node, event, listener);
        debug!(widget = %id, event, binding, listener = listener.raw(), "bound event");
        Ok(listener)
    }

    /// Entry point for a firing listener: marshal its arguments and notify the host.
    ///
    /// Returns `false` for listeners that are no longer bound.
    pub fn handle_event(&mut self, listener: ListenerId, event: &NativeEvent<S::Node>) -> bool {
        let Some(binding) = self.events.lookup(listener) else {
            debug!(listener = listener.raw(), event = %event.name, "stale listener ignored");
            return false;
        };
        let call = HostCall {
            remote_id: binding.remote_id().to_string(),
            binding_name: binding.binding.clone(),
            args: resolve_args(binding, event, &self.surface),
        };
        debug!(remote = %call.remote_id, binding = %call.binding_name, "notifying host");
        self.host.notify(call);
        true
    }

    pub fn add_global_style(&mut self, style_id: &str, css: &str) {
        self.style_sheets.upsert(style_id, css);
        self.surface.upsert_style_sheet(style_id, css);
        debug!(style = %style_id, "installed global style");
    }

    pub fn delete_global_style(&mut self, style_id: &str) {
        if self.style_sheets.remove(style_id) {
            self.surface.remove_style_sheet(style_id);
            debug!(style = %style_id, "deleted global style");
        }
    }

    pub fn add_class(&mut self, id: &str, class: &str) -> Result<()> {
        let node = self.widget_node(id)?;
        let current = self.surface.class_name(&node);
        let mut classes: Vec<&str> = current.split_whitespace().collect();
        if !classes.contains(&class) {
            classes.push(class);
            self.surface.set_class_name(&node, &classes.join(" "));
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: &str, class: &str) -> Result<()> {
        let node = self.widget_node(id)?;
        let current = self.surface.class_name(&node);
        let classes: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        self.surface.set_class_name(&node, &classes.join(" "));
        Ok(())
    }

    /// Read-modify-write a single flat style property.
    pub fn update_style_property(&mut self, id: &str, name: &str, value: &str) -> Result<()> {
        if is_style_group(name) {
            return Err(BridgeError::InvalidValue {
                name: name.to_string(),
                reason: "composite groups are set through the `style` attribute".into(),
            });
        }
        let node = self.widget_node(id)?;
        let mut style = read_style(&self.surface, &node);
        style.properties.insert(name.to_string(), value.to_string());
        write_style(&mut self.surface, &node, &style);
        Ok(())
    }

    /// Removing `border`, `margin` or `padding` clears the whole group.
    pub fn remove_style_property(&mut self, id: &str, name: &str) -> Result<()> {
        let node = self.widget_node(id)?;
        let mut style = read_style(&self.surface, &node);
        match name {
            "border" => style.border = Default::default(),
            "margin" => style.margin = Default::default(),
            "padding" => style.padding = Default::default(),
            _ => {
                style.properties.remove(name);
            }
        }
        write_style(&mut self.surface, &node, &style);
        Ok(())
    }

    /// Composite groups are always present in a read style, so they always exist. A flat
    /// property read back as `""` is unset.
    pub fn has_style_property(&self, id: &str, name: &str) -> Result<bool> {
        let node = self.widget_node(id)?;
        let style = read_style(&self.surface, &node);
        Ok(is_style_group(name) || style.properties.get(name).is_some_and(|v| !v.is_empty()))
    }
}

fn is_style_group(name: &str) -> bool {
    matches!(name, "border" | "margin" | "padding")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingHost;
    use crate::surface::MemorySurface;

    fn bridge() -> Bridge<MemorySurface, RecordingHost> {
        Bridge::new(MemorySurface::new(), RecordingHost::new())
    }

    #[test]
    fn test_layout_under_root_fills_container() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();

        let node = *bridge.node("main").unwrap();
        let root = bridge.surface().anchor(Anchor::Root).unwrap();
        assert_eq!(bridge.surface().parent(node), Some(root));
        assert_eq!(bridge.surface().style_property(&node, "width"), "100%");
        assert_eq!(bridge.surface().style_property(&node, "height"), "100%");
    }

    #[test]
    fn test_nested_widget_registered_detached() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        bridge
            .create(&WidgetSpec::widget("button", "btn").parent("main"))
            .unwrap();

        let node = *bridge.node("btn").unwrap();
        assert_eq!(bridge.surface().parent(node), None);
        assert_eq!(bridge.surface().style_property(&node, "width"), "");
    }

    #[test]
    fn test_auto_attach_inserts_immediately() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        bridge
            .create(&WidgetSpec::widget("button", "btn").parent("main").auto_attach(true))
            .unwrap();

        let main = *bridge.node("main").unwrap();
        let btn = *bridge.node("btn").unwrap();
        assert_eq!(bridge.surface().children(&main), vec![btn]);
    }

    #[test]
    fn test_body_sentinel_any_case() {
        let mut bridge = bridge();
        bridge
            .create(&WidgetSpec::widget("div", "toast").parent("BODY"))
            .unwrap();

        let node = *bridge.node("toast").unwrap();
        let body = bridge.surface().anchor(Anchor::Body).unwrap();
        assert_eq!(bridge.surface().parent(node), Some(body));
    }

    #[test]
    fn test_unknown_parent_fails() {
        let mut bridge = bridge();
        let err = bridge
            .create(&WidgetSpec::widget("button", "btn").parent("nowhere"))
            .unwrap_err();

        assert!(matches!(err, BridgeError::UnknownParent(ref p) if p == "nowhere"));
        assert_eq!(bridge.widget_count(), 0);
    }

    #[test]
    fn test_create_applies_attributes_and_class() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        bridge
            .create(
                &WidgetSpec::widget("input", "name")
                    .class("huf-widget huf-input")
                    .parent("main")
                    .attribute("value", "Ada")
                    .attribute("placeholder", "Name")
                    .attribute("id", "hijack"),
            )
            .unwrap();

        assert_eq!(bridge.get_attribute("name", "value").unwrap(), AttrValue::text("Ada"));
        assert_eq!(
            bridge.get_attribute("name", "placeholder").unwrap(),
            AttrValue::text("Name")
        );
        assert_eq!(bridge.get_attribute("name", "id").unwrap(), AttrValue::text("name"));
        assert_eq!(
            bridge.get_attribute("name", "class").unwrap(),
            AttrValue::text("huf-widget huf-input")
        );
        assert!(bridge.node("hijack").is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        bridge.bind("main", "click", "pressed", vec![], None).unwrap();

        bridge.destroy("main");
        bridge.destroy("main");

        assert_eq!(bridge.widget_count(), 0);
        assert!(bridge.events().is_empty());
    }

    #[test]
    fn test_destroy_releases_surface_listeners() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        bridge.bind("main", "click", "pressed", vec![], None).unwrap();
        bridge.bind("main", "input", "typed", vec![], None).unwrap();
        let node = *bridge.node("main").unwrap();

        bridge.destroy("main");

        assert_eq!(bridge.surface().listener_count(node, "click"), 0);
        assert_eq!(bridge.surface().listener_count(node, "input"), 0);
    }

    #[test]
    fn test_attribute_on_unknown_widget() {
        let mut bridge = bridge();
        assert!(matches!(
            bridge.get_attribute("ghost", "text"),
            Err(BridgeError::UnknownWidget(_))
        ));
        assert!(bridge.set_attribute("ghost", "text", &"x".into()).is_err());
    }

    #[test]
    fn test_rename_requires_string_id() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();

        assert!(bridge.set_attribute("main", "id", &AttrValue::Null).is_err());
        assert!(bridge.set_attribute("main", "id", &"".into()).is_err());
        assert!(bridge.node("main").is_some());
    }

    #[test]
    fn test_rename_onto_existing_widget_displaces_it() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "a")).unwrap();
        bridge.create(&WidgetSpec::layout("div", "b")).unwrap();
        bridge.bind("b", "click", "pressed", vec![], None).unwrap();
        let old_b = *bridge.node("b").unwrap();
        let a = *bridge.node("a").unwrap();

        bridge.set_attribute("a", "id", &"b".into()).unwrap();

        assert_eq!(bridge.widget_ids(), vec!["b".to_string()]);
        assert_eq!(*bridge.node("b").unwrap(), a);
        assert!(!bridge.surface().is_connected(old_b));
        assert_eq!(bridge.surface().listener_count(old_b, "click"), 0);
        assert_eq!(bridge.events().count_for("b"), 0);
    }

    #[test]
    fn test_attach_reports_not_applicable() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();

        assert_eq!(bridge.attach("ghost", "main", None), TreeOutcome::NotApplicable);
        assert_eq!(bridge.attach("main", "ghost", None), TreeOutcome::NotApplicable);
        assert_eq!(bridge.detach("ghost", "main"), TreeOutcome::NotApplicable);
    }

    #[test]
    fn test_stale_listener_is_ignored() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        let listener = bridge.bind("main", "click", "pressed", vec![], None).unwrap();
        let node = *bridge.node("main").unwrap();
        bridge.destroy("main");

        assert!(!bridge.handle_event(listener, &NativeEvent::new("click", node)));
        assert!(bridge.host().calls().is_empty());
    }

    #[test]
    fn test_class_tokens() {
        let mut bridge = bridge();
        bridge
            .create(&WidgetSpec::layout("div", "main").class("huf-layout"))
            .unwrap();

        bridge.add_class("main", "active").unwrap();
        bridge.add_class("main", "active").unwrap();
        assert_eq!(
            bridge.get_attribute("main", "class").unwrap(),
            AttrValue::text("huf-layout active")
        );

        bridge.remove_class("main", "huf-layout").unwrap();
        assert_eq!(
            bridge.get_attribute("main", "class").unwrap(),
            AttrValue::text("active")
        );
    }

    #[test]
    fn test_style_property_helpers() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();

        bridge.update_style_property("main", "color", "red").unwrap();
        assert!(bridge.has_style_property("main", "color").unwrap());
        assert!(bridge.has_style_property("main", "margin").unwrap());
        // Layout sizing survives the read-modify-write.
        assert!(bridge.has_style_property("main", "width").unwrap());

        bridge.remove_style_property("main", "color").unwrap();
        assert!(!bridge.has_style_property("main", "color").unwrap());

        // An unmeasured, unset height reads back as "" and does not count.
        bridge
            .create(&WidgetSpec::widget("span", "label").parent("main"))
            .unwrap();
        assert!(!bridge.has_style_property("label", "height").unwrap());

        assert!(bridge.update_style_property("main", "border", "1px").is_err());
    }

    #[test]
    fn test_remove_style_group_clears_it() {
        let mut bridge = bridge();
        bridge.create(&WidgetSpec::layout("div", "main")).unwrap();
        let node = *bridge.node("main").unwrap();
        bridge.surface_mut().set_style_property(&node, "margin-top", "4px");

        bridge.remove_style_property("main", "margin").unwrap();

        assert_eq!(bridge.surface().style_property(&node, "margin-top"), "");
        assert_eq!(bridge.surface().style_property(&node, "width"), "100%");
    }
}
