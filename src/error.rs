use thiserror::Error;

use crate::core::event::EventHandlerId;
use crate::runtime::component_registry::ComponentId;

/// Failure raised by component-authored code (render, parameter updates, event
/// callbacks, after-render hooks, disposal) or by a display surface.
pub type ComponentError = anyhow::Error;

/// Which asynchronous piece of component work faulted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AsyncOperation {
    ReceiveParameters,
    AfterRender,
}

impl std::fmt::Display for AsyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AsyncOperation::ReceiveParameters => f.write_str("parameter update"),
            AsyncOperation::AfterRender => f.write_str("after-render notification"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no component is registered with id {0}")]
    UnknownComponent(ComponentId),

    #[error("no event handler is bound to id {0}")]
    UnknownEventHandler(EventHandlerId),

    #[error("component {0} is not a root component")]
    NotARootComponent(ComponentId),

    #[error("the current thread is not the renderer's dispatcher context")]
    WrongExecutionContext,

    #[error("a render-to-quiescence pass is already active on this renderer")]
    RenderInProgress,

    #[error("component {component} failed to render: {source}")]
    ComponentRenderFailure {
        component: ComponentId,
        #[source]
        source: ComponentError,
    },

    #[error("{operation} for component {component} failed: {source}")]
    AsyncUpdateFailure {
        component: ComponentId,
        operation: AsyncOperation,
        #[source]
        source: ComponentError,
    },

    #[error("display update failed: {source}")]
    DisplayUpdateFailure {
        #[source]
        source: ComponentError,
    },

    #[error("event handler {handler} failed: {source}")]
    EventHandlerFailure {
        handler: EventHandlerId,
        #[source]
        source: ComponentError,
    },

    #[error("component {component} failed to dispose: {source}")]
    DisposeFailure {
        component: ComponentId,
        #[source]
        source: ComponentError,
    },

    #[error("the renderer owning this dispatcher has been dropped")]
    DispatcherClosed,
}

impl RenderError {
    /// Structural errors indicate misuse and are returned straight to the caller;
    /// every other variant originates in component or display code and is routed
    /// through the exception hook first.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RenderError::UnknownComponent(_)
                | RenderError::NotARootComponent(_)
                | RenderError::UnknownEventHandler(_)
                | RenderError::WrongExecutionContext
                | RenderError::RenderInProgress
                | RenderError::DispatcherClosed
        )
    }
}
