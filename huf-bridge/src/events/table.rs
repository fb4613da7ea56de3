use super::binding::EventBinding;
use crate::surface::ListenerId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BindingKey {
    widget: String,
    event: String,
    binding: String,
}

impl BindingKey {
    fn of(binding: &EventBinding) -> Self {
        Self {
            widget: binding.widget_id.clone(),
            event: binding.event.clone(),
            binding: binding.binding.clone(),
        }
    }
}

/// Listener bookkeeping, at most one listener per (widget, event, binding name).
pub struct EventTable {
    bindings: HashMap<BindingKey, (ListenerId, EventBinding)>,
    listeners: HashMap<ListenerId, BindingKey>,
    next_listener: u64,
}

impl EventTable {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    /// Store `binding` under a fresh listener id.
    ///
    /// Returns the new id and the listener it replaced, which the caller must detach from
    /// the surface.
    pub fn install(&mut self, binding: EventBinding) -> (ListenerId, Option<ListenerId>) {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        let key = BindingKey::of(&binding);
        let replaced = self
            .bindings
            .insert(key.clone(), (id, binding))
            .map(|(old, _)| old);
        if let Some(old) = replaced {
            self.listeners.remove(&old);
        }
        self.listeners.insert(id, key);
        (id, replaced)
    }

    pub fn lookup(&self, listener: ListenerId) -> Option<&EventBinding> {
        let key = self.listeners.get(&listener)?;
        self.bindings.get(key).map(|(_, binding)| binding)
    }

    pub fn listener(&self, widget: &str, event: &str, binding: &str) -> Option<ListenerId> {
        let key = BindingKey {
            widget: widget.to_string(),
            event: event.to_string(),
            binding: binding.to_string(),
        };
        self.bindings.get(&key).map(|(id, _)| *id)
    }

    /// Move every binding of `from` over to `to`. Listener ids are kept.
    pub fn rename_widget(&mut self, from: &str, to: &str) -> usize {
        let moved: Vec<BindingKey> = self
            .bindings
            .keys()
            .filter(|key| key.widget == from)
            .cloned()
            .collect();

        for old_key in &moved {
            if let Some((id, mut binding)) = self.bindings.remove(old_key) {
                binding.widget_id = to.to_string();
                let new_key = BindingKey::of(&binding);
                self.listeners.insert(id, new_key.clone());
                self.bindings.insert(new_key, (id, binding));
            }
        }
        moved.len()
    }

    /// Forget every binding of `widget`, returning `(event, listener)` pairs.
    pub fn drop_widget(&mut self, widget: &str) -> Vec<(String, ListenerId)> {
        let mut dropped = Vec::new();
        self.bindings.retain(|key, (id, _)| {
            if key.widget == widget {
                dropped.push((key.event.clone(), *id));
                false
            } else {
                true
            }
        });
        for (_, id) in &dropped {
            self.listeners.remove(id);
        }
        dropped
    }

    pub fn count_for(&self, widget: &str) -> usize {
        self.bindings.keys().filter(|k| k.widget == widget).count()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new()
    }
}
