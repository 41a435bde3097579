//! Runtime orchestration: component bookkeeping, the dispatcher guard, event
//! bindings, outstanding work and the render engine tying them together.

pub mod component_registry;
pub mod dispatcher;
pub mod event_bindings;
pub mod exceptions;
pub mod handle;
pub mod renderer;
pub mod tasks;

pub use component_registry::{ComponentId, ComponentRegistry, ComponentState};
pub use dispatcher::{Dispatched, Dispatcher};
pub use event_bindings::{EventBinding, EventBindingTable};
pub use exceptions::{ExceptionHandler, LogAndContinue, Rethrow};
pub use handle::RenderHandle;
pub use renderer::Renderer;
pub use tasks::{DispatchOutcome, EventDispatch};
