use std::collections::HashMap;

/// Widget kind requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// May sit directly under the root container and contain other widgets.
    Layout,
    /// Leaf element, only deployable inside a layout.
    Widget,
}

/// Map from host widget id to the surface node it owns.
///
/// Every id maps to exactly one node and a node is reachable through at most one id:
/// inserting over an existing id hands the displaced node back to the caller.
pub struct WidgetRegistry<N> {
    widgets: HashMap<String, N>,
}

impl<N> WidgetRegistry<N> {
    pub fn new() -> Self {
        Self {
            widgets: HashMap::new(),
        }
    }

    /// Register a node, returning the node previously stored under `id`.
    pub fn insert(&mut self, id: &str, node: N) -> Option<N> {
        self.widgets.insert(id.to_string(), node)
    }

    pub fn get(&self, id: &str) -> Option<&N> {
        self.widgets.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<N> {
        self.widgets.remove(id)
    }

    /// Re-key `from` to `to`.
    ///
    /// Returns `None` if `from` is unknown, otherwise the node displaced from `to` (if any).
    pub fn rename(&mut self, from: &str, to: &str) -> Option<Option<N>> {
        let node = self.widgets.remove(from)?;
        Some(self.widgets.insert(to.to_string(), node))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.widgets.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl<N> Default for WidgetRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
