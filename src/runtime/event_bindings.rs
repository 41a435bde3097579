//! Event handler identity table.

use std::collections::HashMap;

use crate::core::event::{EventCallback, EventHandlerId};
use crate::error::RenderError;
use crate::runtime::component_registry::ComponentId;

/// A live binding: the callback and the component that receives the event.
#[derive(Clone, Debug)]
pub struct EventBinding {
    pub callback: EventCallback,
    pub receiver: ComponentId,
}

/// Maps handler identities found in rendered output back to callbacks.
///
/// A re-render that swaps the callback at a logical attribute position records
/// `old -> new` in a replacement chain, so identities a client captured before
/// the latest render still resolve until they are retired.
#[derive(Debug, Default)]
pub struct EventBindingTable {
    next_id: u64,
    bindings: HashMap<EventHandlerId, EventBinding>,
    replacements: HashMap<EventHandlerId, EventHandlerId>,
}

impl EventBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callback` under a fresh identity. An explicit receiver on the
    /// callback wins; otherwise `rendering_component` receives the event.
    pub fn assign(
        &mut self,
        callback: &EventCallback,
        rendering_component: ComponentId,
    ) -> EventHandlerId {
        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("event handler id overflowed u64");
        let id = EventHandlerId::from_raw(self.next_id);
        self.bindings.insert(
            id,
            EventBinding {
                callback: callback.clone(),
                receiver: callback.receiver().unwrap_or(rendering_component),
            },
        );
        id
    }

    pub fn track_replacement(&mut self, old: EventHandlerId, new: EventHandlerId) {
        self.replacements.insert(old, new);
    }

    /// Follow the replacement chain from `id` to the newest identity.
    pub fn latest_in_chain(&self, mut id: EventHandlerId) -> EventHandlerId {
        // Replacements always point at a newer (larger) identity, so the walk ends.
        while let Some(next) = self.replacements.get(&id) {
            id = *next;
        }
        id
    }

    /// Resolve a possibly stale identity to its current binding.
    pub fn resolve(
        &self,
        id: EventHandlerId,
    ) -> Result<(EventHandlerId, &EventBinding), RenderError> {
        let latest = self.latest_in_chain(id);
        self.bindings
            .get(&latest)
            .map(|binding| (latest, binding))
            .ok_or(RenderError::UnknownEventHandler(id))
    }

    /// Remove bindings and the replacement links that start at them.
    pub fn retire(&mut self, ids: &[EventHandlerId]) {
        for id in ids {
            self.bindings.remove(id);
            self.replacements.remove(id);
        }
        tracing::trace!(count = ids.len(), "retired event handler ids");
    }

    pub fn contains(&self, id: EventHandlerId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
