//! Single-writer admission guard.
//!
//! A bound dispatcher records the thread that constructed the renderer. Every
//! mutating entry point checks it first; work arriving from other threads is
//! marshaled through an inbox the renderer drains on its own thread.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::{self, ThreadId};

use tokio::sync::{mpsc, oneshot};

use crate::error::RenderError;

pub(crate) type Work = Box<dyn FnOnce() + Send>;

struct BoundContext {
    owner: ThreadId,
    inbox: mpsc::UnboundedSender<Work>,
}

/// Cloneable, `Send` handle to a renderer's execution context.
#[derive(Clone)]
pub struct Dispatcher {
    bound: Option<Arc<BoundContext>>,
}

impl Dispatcher {
    /// No-op guard for single-threaded hosts: every caller is admitted and
    /// `run_on` always runs inline.
    pub fn unbound() -> Self {
        Self { bound: None }
    }

    /// Bind to the calling thread. The receiver must be drained on this thread.
    pub(crate) fn bind_current_thread() -> (Self, mpsc::UnboundedReceiver<Work>) {
        let (inbox, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            bound: Some(Arc::new(BoundContext {
                owner: thread::current().id(),
                inbox,
            })),
        };
        (dispatcher, receiver)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Whether the calling thread may touch renderer state.
    pub fn has_access(&self) -> bool {
        match &self.bound {
            Some(bound) => bound.owner == thread::current().id(),
            None => true,
        }
    }

    pub fn check_access(&self) -> Result<(), RenderError> {
        if self.has_access() {
            Ok(())
        } else {
            Err(RenderError::WrongExecutionContext)
        }
    }

    /// Run `work` on the renderer's context.
    ///
    /// Runs inline when already there (no suspension, no self-deadlock);
    /// otherwise queues it and returns a future that resolves once the renderer
    /// has run it.
    pub fn run_on<F, R>(&self, work: F) -> Dispatched<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let bound = match &self.bound {
            Some(bound) if bound.owner != thread::current().id() => bound,
            _ => return Dispatched::ready(Ok(work())),
        };

        let (done, receiver) = oneshot::channel();
        let queued: Work = Box::new(move || {
            let _ = done.send(work());
        });
        if bound.inbox.send(queued).is_err() {
            return Dispatched::ready(Err(RenderError::DispatcherClosed));
        }
        Dispatched {
            state: DispatchedState::Waiting(receiver),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("owner", &self.bound.as_ref().map(|bound| bound.owner))
            .finish()
    }
}

enum DispatchedState<R> {
    Ready(Option<Result<R, RenderError>>),
    Waiting(oneshot::Receiver<R>),
}

/// Completion signal for [`Dispatcher::run_on`].
pub struct Dispatched<R> {
    state: DispatchedState<R>,
}

impl<R> Dispatched<R> {
    fn ready(result: Result<R, RenderError>) -> Self {
        Self {
            state: DispatchedState::Ready(Some(result)),
        }
    }

    /// Whether the work already ran inline.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, DispatchedState::Ready(_))
    }
}

// `R` is only ever moved out, never pinned.
impl<R> Unpin for Dispatched<R> {}

impl<R> Future for Dispatched<R> {
    type Output = Result<R, RenderError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            DispatchedState::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(RenderError::DispatcherClosed)))
            }
            DispatchedState::Waiting(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|result| result.map_err(|_| RenderError::DispatcherClosed)),
        }
    }
}

impl<R> fmt::Debug for Dispatched<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatched")
            .field("ready", &self.is_ready())
            .finish()
    }
}
