//! Component registry and identifiers.

use std::collections::HashMap;
use std::fmt;

use crate::core::component::Component;
use crate::error::RenderError;
use crate::render::frame::Frame;
use crate::runtime::handle::RenderHandle;

/// Stable identifier for a component owned by a single `Renderer` instance.
///
/// Semantics:
/// - IDs are unique within a renderer instance.
/// - IDs are never reused for the lifetime of the renderer instance.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ComponentId(u64);

impl ComponentId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bookkeeping for one live component.
pub struct ComponentState {
    id: ComponentId,
    parent: Option<ComponentId>,
    pub(crate) component: Box<dyn Component>,
    /// Output of the most recently committed render.
    pub(crate) frames: Vec<Frame>,
    /// Set while a render of this component sits in the render queue.
    pub(crate) queued: bool,
    pub(crate) has_rendered: bool,
    pub(crate) after_render_notified: bool,
}

impl ComponentState {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Non-owning back reference; lookup only.
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    pub fn has_rendered(&self) -> bool {
        self.has_rendered
    }
}

impl fmt::Debug for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentState")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("frames", &self.frames.len())
            .field("queued", &self.queued)
            .finish_non_exhaustive()
    }
}

/// Arena of component states keyed by identity.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: HashMap<ComponentId, ComponentState>,
    next_id: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identity, store the component and configure it with
    /// the handle `handle_for` builds for that identity. Nothing renders yet.
    pub fn attach<H>(
        &mut self,
        component: Box<dyn Component>,
        parent: Option<ComponentId>,
        handle_for: H,
    ) -> ComponentId
    where
        H: FnOnce(ComponentId) -> RenderHandle,
    {
        let id = ComponentId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("component id overflowed u64");

        let state = self.entries.entry(id).or_insert(ComponentState {
            id,
            parent,
            component,
            frames: Vec::new(),
            queued: false,
            has_rendered: false,
            after_render_notified: false,
        });
        state.component.configure(handle_for(id));
        id
    }

    /// Non-throwing lookup for callers that tolerate components disposed mid-flight.
    pub fn lookup(&self, id: ComponentId) -> Option<&ComponentState> {
        self.entries.get(&id)
    }

    pub fn lookup_mut(&mut self, id: ComponentId) -> Option<&mut ComponentState> {
        self.entries.get_mut(&id)
    }

    /// Lookup where absence is a caller bug.
    pub fn require(&self, id: ComponentId) -> Result<&ComponentState, RenderError> {
        self.lookup(id).ok_or(RenderError::UnknownComponent(id))
    }

    pub fn require_mut(&mut self, id: ComponentId) -> Result<&mut ComponentState, RenderError> {
        self.lookup_mut(id).ok_or(RenderError::UnknownComponent(id))
    }

    /// Drop all bookkeeping for `id`. The disposal hook must already have run.
    pub fn remove(&mut self, id: ComponentId) -> Option<ComponentState> {
        self.entries.remove(&id)
    }

    /// Take every live component out, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<ComponentState> {
        let mut states: Vec<_> = self.entries.drain().map(|(_, state)| state).collect();
        states.sort_by_key(|state| state.id);
        states
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
