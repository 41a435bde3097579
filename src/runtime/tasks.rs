//! Outstanding asynchronous work.
//!
//! Every incomplete completion the renderer receives is tracked together with
//! a [`Continuation`] naming the bookkeeping to run once it settles. Parameter
//! updates started during a quiescence pass go into the pass's pending set;
//! everything else is fire-and-forget background work.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::oneshot;

use crate::core::completion::TaskStatus;
use crate::core::event::EventHandlerId;
use crate::error::RenderError;
use crate::runtime::component_registry::ComponentId;

/// Bookkeeping attached to a tracked completion.
#[derive(Debug)]
pub(crate) enum Continuation {
    ParameterUpdate {
        component: ComponentId,
    },
    AfterRender {
        component: ComponentId,
    },
    EventHandler {
        handler: EventHandlerId,
        notify: oneshot::Sender<DispatchOutcome>,
    },
    DisplayAck {
        retired_handlers: Vec<EventHandlerId>,
        rendered: Vec<ComponentId>,
    },
}

pub(crate) type TrackedTask = LocalBoxFuture<'static, (Continuation, TaskStatus)>;

#[derive(Default)]
pub(crate) struct TaskTracker {
    /// Present only while a quiescence pass runs.
    pending: Option<FuturesUnordered<TrackedTask>>,
    background: FuturesUnordered<TrackedTask>,
}

impl TaskTracker {
    pub(crate) fn begin_quiescence(&mut self) -> Result<(), RenderError> {
        if self.pending.is_some() {
            return Err(RenderError::RenderInProgress);
        }
        self.pending = Some(FuturesUnordered::new());
        Ok(())
    }

    /// End the pass. Tasks that have not settled keep running in the background.
    pub(crate) fn end_quiescence(&mut self) {
        if let Some(leftover) = self.pending.take() {
            self.background.extend(leftover);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_quiescing(&self) -> bool {
        self.pending.is_some()
    }

    /// Next settled task of the active pass; `None` once its pending set is
    /// empty (or no pass runs).
    pub(crate) fn poll_quiescence(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<(Continuation, TaskStatus)>> {
        match &mut self.pending {
            Some(pending) if !pending.is_empty() => pending.poll_next_unpin(cx),
            _ => Poll::Ready(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, FuturesUnordered::len)
    }

    /// Track `future`. Parameter updates join the pending set while a pass is
    /// active; everything else runs in the background.
    pub(crate) fn track(
        &mut self,
        continuation: Continuation,
        future: LocalBoxFuture<'static, TaskStatus>,
    ) {
        let counts_for_quiescence = matches!(continuation, Continuation::ParameterUpdate { .. });
        let task = async move { (continuation, future.await) }.boxed_local();
        match &mut self.pending {
            Some(pending) if counts_for_quiescence => pending.push(task),
            _ => self.background.push(task),
        }
    }

    pub(crate) fn has_background(&self) -> bool {
        !self.background.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn background_len(&self) -> usize {
        self.background.len()
    }

    pub(crate) fn poll_background(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<(Continuation, TaskStatus)>> {
        self.background.poll_next_unpin(cx)
    }
}

/// How an asynchronous event handler finished. Faults have already been
/// routed through the exception hook by the time this is observed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchOutcome {
    Completed,
    Canceled,
    Faulted,
}

impl DispatchOutcome {
    pub(crate) fn of(status: &TaskStatus) -> Self {
        match status {
            TaskStatus::Completed => DispatchOutcome::Completed,
            TaskStatus::Canceled => DispatchOutcome::Canceled,
            TaskStatus::Faulted(_) => DispatchOutcome::Faulted,
        }
    }
}

/// Completion handle returned by `Renderer::dispatch_event`.
///
/// Resolves once the handler's completion settled and the renderer ran its
/// bookkeeping. If the renderer is dropped first it resolves as canceled.
#[derive(Debug)]
pub struct EventDispatch {
    receiver: oneshot::Receiver<DispatchOutcome>,
}

impl EventDispatch {
    pub(crate) fn new(receiver: oneshot::Receiver<DispatchOutcome>) -> Self {
        Self { receiver }
    }

    /// Outcome if the handler already finished.
    pub fn try_outcome(&mut self) -> Option<DispatchOutcome> {
        self.receiver.try_recv().ok()
    }
}

impl Future for EventDispatch {
    type Output = DispatchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|result| result.unwrap_or(DispatchOutcome::Canceled))
    }
}
