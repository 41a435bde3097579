//! Handle a component receives in `configure`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::RenderError;
use crate::runtime::component_registry::ComponentId;
use crate::runtime::dispatcher::{Dispatched, Dispatcher};

/// Render requests made through handles, drained by the renderer at every
/// point where it regains control.
#[derive(Debug, Default)]
pub(crate) struct RenderWake {
    requested: Mutex<VecDeque<ComponentId>>,
}

impl RenderWake {
    fn request_render(&self, id: ComponentId) {
        let mut requested = match self.requested.lock() {
            Ok(requested) => requested,
            Err(poisoned) => poisoned.into_inner(),
        };
        requested.push_back(id);
    }

    pub(crate) fn take_requested(&self) -> VecDeque<ComponentId> {
        let mut requested = match self.requested.lock() {
            Ok(requested) => requested,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *requested)
    }

    pub(crate) fn has_pending(&self) -> bool {
        let requested = match self.requested.lock() {
            Ok(requested) => requested,
            Err(poisoned) => poisoned.into_inner(),
        };
        !requested.is_empty()
    }
}

/// Binding between one component and the renderer that owns it.
///
/// The handle is `Send` so it can travel to background threads, but every use
/// that touches renderer state is checked against the dispatcher; from another
/// thread, go through [`RenderHandle::invoke`].
#[derive(Clone, Debug)]
pub struct RenderHandle {
    component_id: ComponentId,
    wake: Arc<RenderWake>,
    dispatcher: Dispatcher,
}

impl RenderHandle {
    pub(crate) fn new(
        component_id: ComponentId,
        wake: Arc<RenderWake>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            component_id,
            wake,
            dispatcher,
        }
    }

    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Ask the renderer to render this component.
    ///
    /// Requests made while the renderer is invoking component code are picked
    /// up as soon as that code returns; requests for a component that has since
    /// been disposed are dropped.
    pub fn request_render(&self) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        self.wake.request_render(self.component_id);
        Ok(())
    }

    /// Run `work` on the renderer's context; see [`Dispatcher::run_on`].
    pub fn invoke<F, R>(&self, work: F) -> Dispatched<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.dispatcher.run_on(work)
    }
}
