//! Stateful component rendering engine.
//!
//! Invariant: single batch gate. Only the renderer's flush hands batches to
//! the [`DisplaySurface`], one at a time, each acknowledged before the next.
//!
//! # Public API Overview
//! - Implement [`Component`] and attach roots with [`Renderer::add_root_component`].
//! - Drive rendering with [`Renderer::render_root`] or
//!   [`Renderer::render_root_to_quiescence`]; components ask for re-renders
//!   through their [`RenderHandle`].
//! - Deliver client events with [`Renderer::dispatch_event`] using the
//!   [`EventHandlerId`]s stamped into rendered attribute frames.
//! - Receive output as [`RenderBatch`]es of per-component [`RenderTreeDiff`]s.
//! - Marshal work from other threads with [`Dispatcher::run_on`].

#![allow(clippy::type_complexity)]

pub mod config;
pub mod logging;

pub mod core;
pub mod error;
pub mod render;
pub mod runtime;

/// Completion signals returned by component and display code.
pub use crate::core::completion::{Completion, TaskStatus};
/// Component contract and parameters.
pub use crate::core::component::{Component, ComponentType, ParameterValue, Parameters};
/// Display surface contract.
pub use crate::core::display::DisplaySurface;
/// Event payloads and handler identities.
pub use crate::core::event::{EventArgs, EventCallback, EventFieldInfo, EventHandlerId, FieldValue};

/// Error taxonomy.
pub use crate::error::{AsyncOperation, ComponentError, RenderError};

/// Render model, diffs and batches.
pub use crate::render::{
    AttributeValue, Frame, FrameKind, RenderBatch, RenderTreeBuilder, RenderTreeDiff,
    RenderTreeEdit, ReplayError,
};

/// Engine configuration.
pub use crate::config::{DispatcherMode, EnvConfig, RendererOptions};

/// Engine, handles and policies.
pub use crate::runtime::{
    ComponentId, DispatchOutcome, Dispatched, Dispatcher, EventDispatch, ExceptionHandler,
    LogAndContinue, RenderHandle, Renderer, Rethrow,
};
