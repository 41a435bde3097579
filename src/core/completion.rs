//! Completion values returned by component and display work.
//!
//! A [`Completion`] is either already settled or wraps a pending local future.
//! Settling always yields a [`TaskStatus`], so cancellation is an explicit value
//! rather than an error to be caught.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{FutureExt, LocalBoxFuture};

use crate::error::ComponentError;

/// Outcome of a settled completion.
#[derive(Debug)]
pub enum TaskStatus {
    Completed,
    /// Expected outcome, never routed to the exception hook.
    Canceled,
    Faulted(ComponentError),
}

impl TaskStatus {
    pub fn from_result(result: Result<(), ComponentError>) -> Self {
        match result {
            Ok(()) => TaskStatus::Completed,
            Err(err) => TaskStatus::Faulted(err),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskStatus::Canceled)
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, TaskStatus::Faulted(_))
    }
}

enum CompletionState {
    Ready(Option<TaskStatus>),
    Pending(LocalBoxFuture<'static, TaskStatus>),
}

/// A possibly-incomplete unit of asynchronous work.
pub struct Completion {
    state: CompletionState,
}

impl Completion {
    pub fn completed() -> Self {
        Self::from_status(TaskStatus::Completed)
    }

    pub fn canceled() -> Self {
        Self::from_status(TaskStatus::Canceled)
    }

    pub fn faulted(error: impl Into<ComponentError>) -> Self {
        Self::from_status(TaskStatus::Faulted(error.into()))
    }

    pub fn from_status(status: TaskStatus) -> Self {
        Self {
            state: CompletionState::Ready(Some(status)),
        }
    }

    pub fn from_result(result: Result<(), ComponentError>) -> Self {
        Self::from_status(TaskStatus::from_result(result))
    }

    /// Wrap a future that reports its own status.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = TaskStatus> + 'static,
    {
        Self {
            state: CompletionState::Pending(future.boxed_local()),
        }
    }

    /// Wrap a fallible future; `Err` becomes [`TaskStatus::Faulted`].
    pub fn from_fallible<F>(future: F) -> Self
    where
        F: Future<Output = Result<(), ComponentError>> + 'static,
    {
        Self::from_future(future.map(TaskStatus::from_result))
    }

    /// Whether the completion already carries its status.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, CompletionState::Ready(_))
    }

    /// Settle without suspending when possible.
    ///
    /// A pending future is polled once; if it is still incomplete it is handed
    /// back so the caller can track it.
    pub(crate) fn try_settle(self) -> Result<TaskStatus, LocalBoxFuture<'static, TaskStatus>> {
        match self.state {
            CompletionState::Ready(status) => Ok(status.unwrap_or(TaskStatus::Completed)),
            CompletionState::Pending(mut future) => match (&mut future).now_or_never() {
                Some(status) => Ok(status),
                None => Err(future),
            },
        }
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::completed()
    }
}

impl Future for Completion {
    type Output = TaskStatus;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            CompletionState::Ready(status) => {
                Poll::Ready(status.take().unwrap_or(TaskStatus::Completed))
            }
            CompletionState::Pending(future) => future.poll_unpin(cx),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            CompletionState::Ready(status) => {
                f.debug_tuple("Completion::Ready").field(status).finish()
            }
            CompletionState::Pending(_) => f.write_str("Completion::Pending"),
        }
    }
}
