use crate::error::SurfaceError;
use std::fmt;

/// Identifies a listener installed on a surface node.
///
/// The surface never calls into the bridge directly; when a native event fires it hands the
/// listener id back to [`Bridge::handle_event`](crate::Bridge::handle_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Reserved containers that exist before any widget is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The application root container.
    Root,
    /// The document body.
    Body,
}

/// A native interaction event delivered by the surface.
#[derive(Debug, Clone)]
pub struct NativeEvent<N> {
    pub name: String,
    /// Node the event originated from. May be a descendant of the node the listener sits on.
    pub target: N,
    pub detail: serde_json::Value,
}

impl<N> NativeEvent<N> {
    pub fn new(name: impl Into<String>, target: N) -> Self {
        Self {
            name: name.into(),
            target,
            detail: serde_json::Value::Null,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// The live visual tree the bridge executes commands against.
///
/// Implementations handle a specific platform (browser DOM, in-memory document, ...).
/// Tree mutations are fallible because the surface may have diverged from what the host
/// believes; the bridge decides which failures are swallowed.
pub trait Surface {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, SurfaceError>;
    fn anchor(&self, anchor: Anchor) -> Option<Self::Node>;

    fn class_name(&self, node: &Self::Node) -> String;
    fn set_class_name(&mut self, node: &Self::Node, class_name: &str);

    /// Rendered text content, not markup.
    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&mut self, node: &Self::Node, text: &str);

    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&mut self, node: &Self::Node, value: &str);

    fn checked(&self, node: &Self::Node) -> bool;
    fn set_checked(&mut self, node: &Self::Node, checked: bool);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);
    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

    /// Inline style property, `""` when unset.
    fn style_property(&self, node: &Self::Node, property: &str) -> String;
    /// Setting `""` removes the property.
    fn set_style_property(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Measured `(width, height)` in pixels, zero for unrendered nodes.
    fn client_size(&self, node: &Self::Node) -> (u32, u32);

    fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;
    /// Appends `child`, moving it out of any previous parent.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), SurfaceError>;
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: &Self::Node,
    ) -> Result<(), SurfaceError>;
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), SurfaceError>;
    /// Detaches `node` from whatever parent it currently has.
    fn remove(&mut self, node: &Self::Node);

    fn add_listener(&mut self, node: &Self::Node, event: &str, listener: ListenerId);
    fn remove_listener(&mut self, node: &Self::Node, event: &str, listener: ListenerId);

    /// Creates the sheet or replaces the one with the same id.
    fn upsert_style_sheet(&mut self, id: &str, css: &str);
    fn remove_style_sheet(&mut self, id: &str) -> bool;
    fn rename_style_sheet(&mut self, from: &str, to: &str) -> bool;
}
