use super::traits::{Anchor, ListenerId, Surface};
use crate::attrs::parse_declarations;
use crate::config::DEFAULT_ROOT_CONTAINER_ID;
use crate::error::SurfaceError;
use smallvec::SmallVec;
use smartstring::{LazyCompact, SmartString};
use std::fmt::Write as _;

/// Handle to an element stored in a [`MemorySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) u32);

#[derive(Debug, Default)]
struct Element {
    tag: SmartString<LazyCompact>,
    attributes: Vec<(String, String)>,
    /// Inline style properties in assignment order.
    style: Vec<(String, String)>,
    /// Whether a `style` attribute exists at all, even an empty one.
    has_style: bool,
    text: String,
    value: String,
    checked: bool,
    children: Vec<NodeKey>,
    listeners: SmallVec<[(SmartString<LazyCompact>, ListenerId); 2]>,
    client_size: (u32, u32),
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    fn serialize_style(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Arena-backed in-memory document.
///
/// Follows DOM semantics closely enough for the bridge to be exercised headless: appending a
/// node moves it, the `style` attribute and inline style properties share one store, events
/// bubble from the target through its ancestors, and replacing a style sheet moves it last.
pub struct MemorySurface {
    nodes: Vec<Option<Element>>,
    parents: Vec<Option<NodeKey>>,
    body: NodeKey,
    root: NodeKey,
    style_sheets: Vec<(String, String)>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::with_root_id(DEFAULT_ROOT_CONTAINER_ID)
    }

    /// Creates a document whose root container carries the given element id.
    pub fn with_root_id(root_id: &str) -> Self {
        let mut surface = Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            body: NodeKey(0),
            root: NodeKey(0),
            style_sheets: Vec::new(),
        };
        surface.body = surface.alloc(Element::new("body"));
        let mut root = Element::new("div");
        root.attributes.push(("id".into(), root_id.into()));
        surface.root = surface.alloc(root);
        surface.link(surface.body, surface.root, None);
        surface
    }

    fn alloc(&mut self, element: Element) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(Some(element));
        self.parents.push(None);
        key
    }

    fn get(&self, key: NodeKey) -> Option<&Element> {
        self.nodes.get(key.0 as usize)?.as_ref()
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut Element> {
        self.nodes.get_mut(key.0 as usize)?.as_mut()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        *self.parents.get(key.0 as usize)?
    }

    pub fn tag(&self, key: NodeKey) -> Option<&str> {
        self.get(key).map(|e| e.tag.as_str())
    }

    /// True if `key` is reachable from the document body.
    pub fn is_connected(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Test hook standing in for native layout.
    pub fn set_client_size(&mut self, key: NodeKey, width: u32, height: u32) {
        if let Some(el) = self.get_mut(key) {
            el.client_size = (width, height);
        }
    }

    pub fn listener_count(&self, key: NodeKey, event: &str) -> usize {
        self.get(key)
            .map(|e| e.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Simulates a native event on `target`, returning the listeners it reaches in firing
    /// order: the target's own listeners first, then each ancestor's.
    pub fn dispatch(&self, target: NodeKey, event: &str) -> Vec<ListenerId> {
        let mut fired = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if let Some(el) = self.get(node) {
                fired.extend(
                    el.listeners
                        .iter()
                        .filter(|(name, _)| name == event)
                        .map(|(_, id)| *id),
                );
            }
            current = self.parent(node);
        }
        fired
    }

    pub fn style_sheet(&self, id: &str) -> Option<&str> {
        self.style_sheets
            .iter()
            .find(|(sheet, _)| sheet == id)
            .map(|(_, css)| css.as_str())
    }

    /// Sheet ids in document order.
    pub fn style_sheet_ids(&self) -> Vec<&str> {
        self.style_sheets.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Indented outline of the connected tree, one element per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(self.body, 0, &mut out);
        out
    }

    fn write_outline(&self, key: NodeKey, depth: usize, out: &mut String) {
        let Some(el) = self.get(key) else {
            return;
        };
        let _ = write!(out, "{}{}", "  ".repeat(depth), el.tag);
        if let Some(id) = self.attribute(&key, "id") {
            let _ = write!(out, "#{id}");
        }
        for class in self.class_name(&key).split_whitespace() {
            let _ = write!(out, ".{class}");
        }
        if !el.text.is_empty() {
            let _ = write!(out, " {:?}", el.text);
        }
        out.push('\n');
        for child in &el.children {
            self.write_outline(*child, depth + 1, out);
        }
    }

    fn unlink(&mut self, child: NodeKey) {
        if let Some(parent) = self.parent(child) {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != child);
            }
            self.parents[child.0 as usize] = None;
        }
    }

    fn link(&mut self, parent: NodeKey, child: NodeKey, position: Option<usize>) {
        if let Some(p) = self.get_mut(parent) {
            match position {
                Some(idx) if idx <= p.children.len() => p.children.insert(idx, child),
                _ => p.children.push(child),
            }
            self.parents[child.0 as usize] = Some(parent);
        }
    }

    /// Rejects unknown nodes and insertions that would make a node its own ancestor.
    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> Result<(), SurfaceError> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(SurfaceError::UnknownNode);
        }
        let mut current = Some(parent);
        while let Some(node) = current {
            if node == child {
                return Err(SurfaceError::Backend(
                    "node cannot be inserted into its own subtree".into(),
                ));
            }
            current = self.parent(node);
        }
        Ok(())
    }

    fn collect_text(&self, key: NodeKey, out: &mut String) {
        if let Some(el) = self.get(key) {
            out.push_str(&el.text);
            for child in &el.children {
                self.collect_text(*child, out);
            }
        }
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_inline_style(raw: &str) -> Vec<(String, String)> {
    // Empty declarations are invalid CSS and dropped, as a browser would.
    parse_declarations(raw)
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

impl Surface for MemorySurface {
    type Node = NodeKey;

    fn create_element(&mut self, tag: &str) -> Result<NodeKey, SurfaceError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SurfaceError::Backend(format!("invalid tag name `{tag}`")));
        }
        Ok(self.alloc(Element::new(tag)))
    }

    fn anchor(&self, anchor: Anchor) -> Option<NodeKey> {
        Some(match anchor {
            Anchor::Root => self.root,
            Anchor::Body => self.body,
        })
    }

    fn class_name(&self, node: &NodeKey) -> String {
        self.attribute(node, "class").unwrap_or_default()
    }

    fn set_class_name(&mut self, node: &NodeKey, class_name: &str) {
        self.set_attribute(node, "class", class_name);
    }

    fn text(&self, node: &NodeKey) -> String {
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        out
    }

    fn set_text(&mut self, node: &NodeKey, text: &str) {
        let children = match self.get_mut(*node) {
            Some(el) => {
                el.text = text.to_string();
                std::mem::take(&mut el.children)
            }
            None => return,
        };
        for child in children {
            self.parents[child.0 as usize] = None;
        }
    }

    fn value(&self, node: &NodeKey) -> String {
        self.get(*node).map(|e| e.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: &NodeKey, value: &str) {
        if let Some(el) = self.get_mut(*node) {
            el.value = value.to_string();
        }
    }

    fn checked(&self, node: &NodeKey) -> bool {
        self.get(*node).map(|e| e.checked).unwrap_or(false)
    }

    fn set_checked(&mut self, node: &NodeKey, checked: bool) {
        if let Some(el) = self.get_mut(*node) {
            el.checked = checked;
        }
    }

    fn attribute(&self, node: &NodeKey, name: &str) -> Option<String> {
        let el = self.get(*node)?;
        if name == "style" {
            return el.has_style.then(|| el.serialize_style());
        }
        el.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: &NodeKey, name: &str, value: &str) {
        let Some(el) = self.get_mut(*node) else {
            return;
        };
        if name == "style" {
            el.style = parse_inline_style(value);
            el.has_style = true;
            return;
        }
        match el.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: &NodeKey, name: &str) {
        let Some(el) = self.get_mut(*node) else {
            return;
        };
        if name == "style" {
            el.style.clear();
            el.has_style = false;
            return;
        }
        el.attributes.retain(|(k, _)| k != name);
    }

    fn has_attribute(&self, node: &NodeKey, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn style_property(&self, node: &NodeKey, property: &str) -> String {
        self.get(*node)
            .and_then(|el| el.style.iter().find(|(k, _)| k == property))
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    fn set_style_property(&mut self, node: &NodeKey, property: &str, value: &str) {
        let Some(el) = self.get_mut(*node) else {
            return;
        };
        if value.is_empty() {
            el.style.retain(|(k, _)| k != property);
            return;
        }
        el.has_style = true;
        match el.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => el.style.push((property.to_string(), value.to_string())),
        }
    }

    fn client_size(&self, node: &NodeKey) -> (u32, u32) {
        self.get(*node).map(|e| e.client_size).unwrap_or((0, 0))
    }

    fn children(&self, parent: &NodeKey) -> Vec<NodeKey> {
        self.get(*parent)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn append_child(&mut self, parent: &NodeKey, child: &NodeKey) -> Result<(), SurfaceError> {
        self.check_insert(*parent, *child)?;
        self.unlink(*child);
        self.link(*parent, *child, None);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeKey,
        child: &NodeKey,
        reference: &NodeKey,
    ) -> Result<(), SurfaceError> {
        self.check_insert(*parent, *child)?;
        if self.parent(*reference) != Some(*parent) {
            return Err(SurfaceError::NotAChild);
        }
        if child == reference {
            return Ok(());
        }
        self.unlink(*child);
        let position = self
            .get(*parent)
            .and_then(|p| p.children.iter().position(|c| c == reference));
        self.link(*parent, *child, position);
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeKey, child: &NodeKey) -> Result<(), SurfaceError> {
        if self.get(*parent).is_none() || self.get(*child).is_none() {
            return Err(SurfaceError::UnknownNode);
        }
        if self.parent(*child) != Some(*parent) {
            return Err(SurfaceError::NotAChild);
        }
        self.unlink(*child);
        Ok(())
    }

    fn remove(&mut self, node: &NodeKey) {
        self.unlink(*node);
    }

    fn add_listener(&mut self, node: &NodeKey, event: &str, listener: ListenerId) {
        if let Some(el) = self.get_mut(*node) {
            el.listeners.push((event.into(), listener));
        }
    }

    fn remove_listener(&mut self, node: &NodeKey, event: &str, listener: ListenerId) {
        if let Some(el) = self.get_mut(*node) {
            el.listeners
                .retain(|(name, id)| !(name == event && *id == listener));
        }
    }

    fn upsert_style_sheet(&mut self, id: &str, css: &str) {
        self.style_sheets.retain(|(sheet, _)| sheet != id);
        self.style_sheets.push((id.to_string(), css.to_string()));
    }

    fn remove_style_sheet(&mut self, id: &str) -> bool {
        let before = self.style_sheets.len();
        self.style_sheets.retain(|(sheet, _)| sheet != id);
        self.style_sheets.len() != before
    }

    fn rename_style_sheet(&mut self, from: &str, to: &str) -> bool {
        match self.style_sheets.iter_mut().find(|(sheet, _)| sheet == from) {
            Some((sheet, _)) => {
                *sheet = to.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_rejected() {
        let mut surface = MemorySurface::new();
        assert!(surface.create_element("").is_err());
        assert!(surface.create_element("not a tag").is_err());
        assert!(surface.create_element("my-widget").is_ok());
    }

    #[test]
    fn test_append_moves_node() {
        let mut surface = MemorySurface::new();
        let a = surface.create_element("div").unwrap();
        let b = surface.create_element("div").unwrap();
        let child = surface.create_element("span").unwrap();

        surface.append_child(&a, &child).unwrap();
        surface.append_child(&b, &child).unwrap();

        assert!(surface.children(&a).is_empty());
        assert_eq!(surface.children(&b), vec![child]);
        assert_eq!(surface.parent(child), Some(b));
    }

    #[test]
    fn test_insert_before_requires_child_reference() {
        let mut surface = MemorySurface::new();
        let parent = surface.create_element("div").unwrap();
        let stranger = surface.create_element("div").unwrap();
        let child = surface.create_element("span").unwrap();

        let result = surface.insert_before(&parent, &child, &stranger);
        assert_eq!(result, Err(SurfaceError::NotAChild));
        assert_eq!(surface.parent(child), None);
    }

    #[test]
    fn test_insert_into_own_subtree_fails() {
        let mut surface = MemorySurface::new();
        let outer = surface.create_element("div").unwrap();
        let inner = surface.create_element("div").unwrap();
        surface.append_child(&outer, &inner).unwrap();

        assert!(surface.append_child(&inner, &outer).is_err());
    }

    #[test]
    fn test_remove_child_of_wrong_parent() {
        let mut surface = MemorySurface::new();
        let parent = surface.create_element("div").unwrap();
        let child = surface.create_element("span").unwrap();

        assert_eq!(
            surface.remove_child(&parent, &child),
            Err(SurfaceError::NotAChild)
        );
    }

    #[test]
    fn test_style_attribute_and_properties_share_store() {
        let mut surface = MemorySurface::new();
        let node = surface.create_element("div").unwrap();

        assert_eq!(surface.attribute(&node, "style"), None);

        surface.set_attribute(&node, "style", "color:red;width:10px;");
        surface.set_style_property(&node, "margin-left", "4px");
        assert_eq!(surface.style_property(&node, "color"), "red");
        assert_eq!(
            surface.attribute(&node, "style").as_deref(),
            Some("color: red; width: 10px; margin-left: 4px;")
        );

        surface.set_style_property(&node, "color", "");
        assert_eq!(surface.style_property(&node, "color"), "");
    }

    #[test]
    fn test_dispatch_bubbles_to_ancestors() {
        let mut surface = MemorySurface::new();
        let outer = surface.create_element("div").unwrap();
        let inner = surface.create_element("input").unwrap();
        surface.append_child(&outer, &inner).unwrap();

        surface.add_listener(&outer, "click", ListenerId(1));
        surface.add_listener(&inner, "click", ListenerId(2));
        surface.add_listener(&inner, "input", ListenerId(3));

        assert_eq!(
            surface.dispatch(inner, "click"),
            vec![ListenerId(2), ListenerId(1)]
        );
    }

    #[test]
    fn test_set_text_drops_children() {
        let mut surface = MemorySurface::new();
        let parent = surface.create_element("div").unwrap();
        let child = surface.create_element("span").unwrap();
        surface.append_child(&parent, &child).unwrap();

        surface.set_text(&parent, "hello");

        assert_eq!(surface.text(&parent), "hello");
        assert!(surface.children(&parent).is_empty());
        assert_eq!(surface.parent(child), None);
    }

    #[test]
    fn test_upsert_style_sheet_moves_last() {
        let mut surface = MemorySurface::new();
        surface.upsert_style_sheet("a", "x{}");
        surface.upsert_style_sheet("b", "y{}");
        surface.upsert_style_sheet("a", "z{}");

        assert_eq!(surface.style_sheet_ids(), vec!["b", "a"]);
        assert_eq!(surface.style_sheet("a"), Some("z{}"));
    }

    #[test]
    fn test_root_container_is_connected() {
        let surface = MemorySurface::new();
        let root = surface.anchor(Anchor::Root).unwrap();

        assert!(surface.is_connected(root));
        assert_eq!(
            surface.attribute(&root, "id").as_deref(),
            Some(DEFAULT_ROOT_CONTAINER_ID)
        );
    }
}
