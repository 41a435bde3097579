//! The render engine.
//!
//! Invariant: component state, the render queue, the handler table and the
//! batch builder are only touched from the dispatcher's context. Component
//! code never holds a reference to the renderer; it talks to it through
//! [`RenderHandle`]s, whose requests are drained every time control returns
//! here.

use std::collections::VecDeque;
use std::future::poll_fn;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::config::{DispatcherMode, RendererOptions};
use crate::core::completion::{Completion, TaskStatus};
use crate::core::component::{Component, Parameters};
use crate::core::display::DisplaySurface;
use crate::core::event::{EventArgs, EventFieldInfo, EventHandlerId, FieldValue};
use crate::error::{AsyncOperation, RenderError};
use crate::logging;
use crate::render::batch::{BatchBuilder, RenderBatch};
use crate::render::builder::RenderTreeBuilder;
use crate::render::diff::{diff_frames, DiffObserver};
use crate::render::frame::{AttributeValue, Frame, FrameKind};
use crate::runtime::component_registry::{ComponentId, ComponentRegistry, ComponentState};
use crate::runtime::dispatcher::{Dispatcher, Work};
use crate::runtime::event_bindings::EventBindingTable;
use crate::runtime::exceptions::{ExceptionHandler, Rethrow};
use crate::runtime::handle::{RenderHandle, RenderWake};
use crate::runtime::tasks::{Continuation, DispatchOutcome, EventDispatch, TaskTracker};

/// Something that needs the engine's attention while it waits.
enum Wakeup {
    Work(Work),
    Task(Continuation, TaskStatus),
    RenderRequested,
}

pub struct Renderer<D: DisplaySurface> {
    display: D,
    exceptions: Box<dyn ExceptionHandler>,
    dispatcher: Dispatcher,
    inbox: Option<mpsc::UnboundedReceiver<Work>>,
    wake: Arc<RenderWake>,
    registry: ComponentRegistry,
    handlers: EventBindingTable,
    render_queue: VecDeque<ComponentId>,
    batch: BatchBuilder,
    builder: RenderTreeBuilder,
    tasks: TaskTracker,
    batch_in_progress: bool,
    flush_suppressed: bool,
    /// Set from handing a batch to the display until its acknowledgment ran.
    display_busy: bool,
    undelivered: VecDeque<RenderBatch>,
    batches_emitted: u64,
}

impl<D: DisplaySurface> Renderer<D> {
    /// Renderer bound to the calling thread, rethrowing every failure.
    pub fn new(display: D) -> Self {
        Self::with_options(display, RendererOptions::default())
    }

    pub fn with_options(display: D, options: RendererOptions) -> Self {
        let (dispatcher, inbox) = match options.dispatcher {
            DispatcherMode::CurrentThread => {
                let (dispatcher, inbox) = Dispatcher::bind_current_thread();
                (dispatcher, Some(inbox))
            }
            DispatcherMode::Unbound => (Dispatcher::unbound(), None),
        };
        Self {
            display,
            exceptions: Box::new(Rethrow),
            dispatcher,
            inbox,
            wake: Arc::new(RenderWake::default()),
            registry: ComponentRegistry::new(),
            handlers: EventBindingTable::new(),
            render_queue: VecDeque::new(),
            batch: BatchBuilder::new(),
            builder: RenderTreeBuilder::new(),
            tasks: TaskTracker::default(),
            batch_in_progress: false,
            flush_suppressed: false,
            display_busy: false,
            undelivered: VecDeque::new(),
            batches_emitted: 0,
        }
    }

    pub fn set_exception_handler<H>(&mut self, handler: H)
    where
        H: ExceptionHandler + 'static,
    {
        self.exceptions = Box::new(handler);
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentState> {
        self.registry.lookup(id)
    }

    pub fn component_count(&self) -> usize {
        self.registry.len()
    }

    pub fn event_bindings(&self) -> &EventBindingTable {
        &self.handlers
    }

    pub fn batches_emitted(&self) -> u64 {
        self.batches_emitted
    }

    /// Whether fire-and-forget work or render requests are still outstanding.
    pub fn has_pending_work(&self) -> bool {
        self.tasks.has_background() || self.wake.has_pending() || !self.render_queue.is_empty()
    }

    /// Attach a top-level component. It is configured but does not render
    /// until [`Renderer::render_root`] hands it parameters.
    pub fn add_root_component<C>(&mut self, component: C) -> Result<ComponentId, RenderError>
    where
        C: Component + 'static,
    {
        self.dispatcher.check_access()?;
        let (wake, dispatcher) = (&self.wake, &self.dispatcher);
        Ok(self.registry.attach(Box::new(component), None, |id| {
            RenderHandle::new(id, Arc::clone(wake), dispatcher.clone())
        }))
    }

    /// Dispose a root and everything beneath it in a batch of its own.
    pub fn remove_root_component(&mut self, id: ComponentId) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        if self.registry.require(id)?.parent().is_some() {
            return Err(RenderError::NotARootComponent(id));
        }
        self.batch.queue_disposal(id);
        self.process_render_queue()
    }

    /// Hand `parameters` to a root and flush whatever it asked to render.
    ///
    /// Returns once the synchronous part ran; an incomplete parameter update
    /// keeps running as background work (see [`Renderer::wait_for_idle`]).
    pub fn render_root(
        &mut self,
        id: ComponentId,
        parameters: Parameters,
    ) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        let state = self.registry.require_mut(id)?;
        let completion = state.component.receive_parameters(parameters);
        let routed =
            self.settle_or_track(Continuation::ParameterUpdate { component: id }, completion);
        let flushed = self.process_pending_renders();
        routed.and(flushed)
    }

    /// Render a root and wait until every parameter update it set off,
    /// transitively through newly attached descendants, has settled.
    ///
    /// Only one pass may run at a time. Dropping the future ends the pass;
    /// work it had not awaited yet keeps running in the background.
    pub async fn render_root_to_quiescence(
        &mut self,
        id: ComponentId,
        parameters: Parameters,
    ) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        self.registry.require(id)?;
        self.tasks.begin_quiescence()?;
        let mut pass = QuiescencePass { renderer: self };
        pass.run(id, parameters).await
    }

    /// Queue a render of `id`. Requests for disposed components are dropped.
    pub fn request_render(&mut self, id: ComponentId) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        self.enqueue(id)
    }

    /// Deliver an event to the handler stamped `handler_id`.
    ///
    /// `handler_id` may be stale; it is followed through the replacement chain
    /// to the newest identity. Every render the handler requests lands in a
    /// single batch flushed after it returns. The returned future tracks the
    /// handler's asynchronous remainder.
    pub fn dispatch_event(
        &mut self,
        handler_id: EventHandlerId,
        field: Option<EventFieldInfo>,
        args: EventArgs,
    ) -> Result<EventDispatch, RenderError> {
        self.dispatcher.check_access()?;
        let (resolved, binding) = self.handlers.resolve(handler_id)?;
        let binding = binding.clone();
        logging::log_event(handler_id, resolved, binding.receiver);

        if let Some(field) = field {
            let state = self.registry.require_mut(field.component_id)?;
            apply_field_value(&mut state.frames, resolved, &field.value);
        }

        self.flush_suppressed = true;
        let completion = match self.registry.lookup_mut(binding.receiver) {
            Some(receiver) => receiver.component.handle_event(&binding.callback, &args),
            None => binding.callback.invoke(&args),
        };
        let (notify, outcome) = oneshot::channel();
        let routed = self.settle_or_track(
            Continuation::EventHandler {
                handler: resolved,
                notify,
            },
            completion,
        );
        self.flush_suppressed = false;

        let flushed = self.process_pending_renders();
        routed.and(flushed)?;
        Ok(EventDispatch::new(outcome))
    }

    /// Run marshaled work and flush pending render requests without waiting
    /// on anything.
    pub fn process_pending(&mut self) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        while let Some(work) = self.inbox.as_mut().and_then(|inbox| inbox.try_recv().ok()) {
            work();
        }
        self.process_pending_renders()
    }

    /// Drive background work (parameter updates, event handlers, display
    /// acknowledgments, after-render hooks, marshaled work) until none is left.
    pub async fn wait_for_idle(&mut self) -> Result<(), RenderError> {
        self.dispatcher.check_access()?;
        loop {
            self.process_pending()?;
            if !self.tasks.has_background() && !self.wake.has_pending() {
                return Ok(());
            }
            let wakeup = poll_fn(|cx| self.poll_wakeup(cx)).await;
            self.handle_wakeup(wakeup)?;
        }
    }

    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError> {
        self.exceptions.handle_exception(error)
    }

    fn queue_render(&mut self, id: ComponentId) {
        let Some(state) = self.registry.lookup_mut(id) else {
            tracing::trace!(component = %id, "dropping render request for disposed component");
            return;
        };
        if state.queued {
            return;
        }
        state.queued = true;
        self.render_queue.push_back(id);
    }

    fn drain_wake(&mut self) {
        for id in self.wake.take_requested() {
            self.queue_render(id);
        }
    }

    fn enqueue(&mut self, id: ComponentId) -> Result<(), RenderError> {
        self.queue_render(id);
        if self.batch_in_progress || self.flush_suppressed {
            return Ok(());
        }
        self.process_render_queue()
    }

    fn process_pending_renders(&mut self) -> Result<(), RenderError> {
        self.drain_wake();
        if self.batch_in_progress || self.flush_suppressed || self.render_queue.is_empty() {
            return Ok(());
        }
        self.process_render_queue()
    }

    /// Flush: render until the queue is empty, then hand the batch over.
    /// Renders requested while the batch was delivered start another flush.
    fn process_render_queue(&mut self) -> Result<(), RenderError> {
        if self.batch_in_progress {
            return Ok(());
        }
        loop {
            self.batch_in_progress = true;
            let rendered = self.render_until_drained();
            self.batch_in_progress = false;
            if let Err(error) = rendered {
                self.salvage_flush();
                return Err(error);
            }

            if !self.batch.is_empty() {
                let batch = self.batch.take_batch();
                self.deliver(batch)?;
            }

            self.drain_wake();
            if self.render_queue.is_empty() && !self.batch.has_pending_disposals() {
                return Ok(());
            }
        }
    }

    /// A failure was rethrown mid-flush. Finish the disposals it interrupted
    /// and hand over what was already rendered, so the display keeps matching
    /// the committed frames. Follow-up failures are logged; the caller sees
    /// the first one.
    fn salvage_flush(&mut self) {
        while self.batch.has_pending_disposals() {
            if let Err(error) = self.process_disposal_queue() {
                tracing::warn!(error = %error, "disposal failed after an aborted flush");
            }
        }
        if self.batch.is_empty() {
            return;
        }
        let batch = self.batch.take_batch();
        if let Err(error) = self.deliver(batch) {
            tracing::warn!(error = %error, "delivery failed after an aborted flush");
        }
    }

    fn render_until_drained(&mut self) -> Result<(), RenderError> {
        loop {
            self.drain_wake();
            let Some(id) = self.render_queue.pop_front() else {
                break;
            };
            self.render_component(id)?;
            self.process_disposal_queue()?;
        }
        self.process_disposal_queue()
    }

    fn render_component(&mut self, id: ComponentId) -> Result<(), RenderError> {
        let Some(state) = self.registry.lookup_mut(id) else {
            return Ok(());
        };
        state.queued = false;

        let rendered = state
            .component
            .render(&mut self.builder)
            .and_then(|()| self.builder.finish());
        let mut frames = match rendered {
            Ok(frames) => frames,
            Err(source) => {
                // Previous output stays committed.
                self.builder.recycle(Vec::new());
                return self.handle_exception(RenderError::ComponentRenderFailure {
                    component: id,
                    source,
                });
            }
        };
        let previous = std::mem::take(&mut state.frames);

        let mut edits = self.batch.take_edit_buffer();
        let mut materializer = FrameMaterializer {
            owner: id,
            registry: &mut self.registry,
            handlers: &mut self.handlers,
            tasks: &mut self.tasks,
            wake: &self.wake,
            dispatcher: &self.dispatcher,
            removed_components: Vec::new(),
            retired_handlers: Vec::new(),
            settled: Vec::new(),
        };
        diff_frames(
            &previous,
            &mut frames,
            self.batch.reference_frames_mut(),
            &mut edits,
            &mut materializer,
        );
        let FrameMaterializer {
            removed_components,
            retired_handlers,
            settled,
            ..
        } = materializer;

        if let Some(state) = self.registry.lookup_mut(id) {
            state.frames = frames;
            state.has_rendered = true;
        }
        self.builder.recycle(previous);
        self.batch.push_diff(id, edits);
        for child in removed_components {
            self.batch.queue_disposal(child);
        }
        for handler in retired_handlers {
            self.batch.record_disposed_handler(handler);
        }
        for (continuation, status) in settled {
            self.complete_task(continuation, status)?;
        }
        Ok(())
    }

    fn process_disposal_queue(&mut self) -> Result<(), RenderError> {
        while let Some(id) = self.batch.next_disposal() {
            self.dispose_component(id)?;
        }
        Ok(())
    }

    fn dispose_component(&mut self, id: ComponentId) -> Result<(), RenderError> {
        let Some(state) = self.registry.lookup_mut(id) else {
            return Ok(());
        };
        let disposed = state.component.dispose();
        let frames = std::mem::take(&mut state.frames);
        for frame in &frames {
            if let Some(child) = frame.component_id() {
                self.batch.queue_disposal(child);
            }
            if let Some(handler) = frame.handler_id() {
                self.batch.record_disposed_handler(handler);
            }
        }
        self.registry.remove(id);
        self.batch.record_disposed_component(id);
        self.builder.recycle(frames);

        match disposed {
            Ok(()) => Ok(()),
            Err(source) => self.handle_exception(RenderError::DisposeFailure {
                component: id,
                source,
            }),
        }
    }

    fn deliver(&mut self, batch: RenderBatch) -> Result<(), RenderError> {
        if self.display_busy {
            self.undelivered.push_back(batch);
            return Ok(());
        }
        self.send_to_display(batch)
    }

    fn deliver_next(&mut self) -> Result<(), RenderError> {
        if self.display_busy {
            return Ok(());
        }
        match self.undelivered.pop_front() {
            Some(batch) => self.send_to_display(batch),
            None => Ok(()),
        }
    }

    fn send_to_display(&mut self, batch: RenderBatch) -> Result<(), RenderError> {
        self.batches_emitted += 1;
        logging::log_batch(self.batches_emitted, &batch);
        self.display_busy = true;

        let rendered = rendered_components(&batch);
        let acknowledgment = self.display.update_display(&batch);
        match acknowledgment.try_settle() {
            Ok(status) => {
                let acknowledged =
                    self.acknowledge(&batch.disposed_event_handler_ids, &rendered, status);
                self.batch.recycle(batch);
                acknowledged
            }
            Err(pending) => {
                // The batch goes back to the pool now; the continuation needs its own copy.
                let retired_handlers = batch.disposed_event_handler_ids.clone();
                self.batch.recycle(batch);
                self.tasks.track(
                    Continuation::DisplayAck {
                        retired_handlers,
                        rendered,
                    },
                    pending,
                );
                Ok(())
            }
        }
    }

    fn acknowledge(
        &mut self,
        retired_handlers: &[EventHandlerId],
        rendered: &[ComponentId],
        status: TaskStatus,
    ) -> Result<(), RenderError> {
        self.display_busy = false;
        self.handlers.retire(retired_handlers);
        let notified = match status {
            TaskStatus::Completed => self.notify_after_render(rendered),
            TaskStatus::Canceled => Ok(()),
            TaskStatus::Faulted(source) => {
                self.handle_exception(RenderError::DisplayUpdateFailure { source })
            }
        };
        let delivered = self.deliver_next();
        notified.and(delivered)
    }

    fn notify_after_render(&mut self, rendered: &[ComponentId]) -> Result<(), RenderError> {
        for &id in rendered {
            let Some(state) = self.registry.lookup_mut(id) else {
                continue;
            };
            let first_render = !state.after_render_notified;
            state.after_render_notified = true;
            let completion = state.component.after_render(first_render);
            self.settle_or_track(Continuation::AfterRender { component: id }, completion)?;
        }
        Ok(())
    }

    fn settle_or_track(
        &mut self,
        continuation: Continuation,
        completion: Completion,
    ) -> Result<(), RenderError> {
        match completion.try_settle() {
            Ok(status) => self.complete_task(continuation, status),
            Err(pending) => {
                self.tasks.track(continuation, pending);
                Ok(())
            }
        }
    }

    fn complete_task(
        &mut self,
        continuation: Continuation,
        status: TaskStatus,
    ) -> Result<(), RenderError> {
        match continuation {
            Continuation::ParameterUpdate { component } => {
                self.route_fault(component, AsyncOperation::ReceiveParameters, status)
            }
            Continuation::AfterRender { component } => {
                self.route_fault(component, AsyncOperation::AfterRender, status)
            }
            Continuation::EventHandler { handler, notify } => {
                let outcome = DispatchOutcome::of(&status);
                let routed = match status {
                    TaskStatus::Faulted(source) => {
                        self.handle_exception(RenderError::EventHandlerFailure { handler, source })
                    }
                    TaskStatus::Completed | TaskStatus::Canceled => Ok(()),
                };
                let _ = notify.send(outcome);
                routed
            }
            Continuation::DisplayAck {
                retired_handlers,
                rendered,
            } => self.acknowledge(&retired_handlers, &rendered, status),
        }
    }

    fn route_fault(
        &mut self,
        component: ComponentId,
        operation: AsyncOperation,
        status: TaskStatus,
    ) -> Result<(), RenderError> {
        match status {
            TaskStatus::Faulted(source) => self.handle_exception(RenderError::AsyncUpdateFailure {
                component,
                operation,
                source,
            }),
            TaskStatus::Completed | TaskStatus::Canceled => Ok(()),
        }
    }

    fn poll_wakeup(&mut self, cx: &mut Context<'_>) -> Poll<Wakeup> {
        if self.wake.has_pending() {
            return Poll::Ready(Wakeup::RenderRequested);
        }
        if let Some(inbox) = self.inbox.as_mut() {
            if let Poll::Ready(Some(work)) = inbox.poll_recv(cx) {
                return Poll::Ready(Wakeup::Work(work));
            }
        }
        if let Poll::Ready(Some((continuation, status))) = self.tasks.poll_background(cx) {
            return Poll::Ready(Wakeup::Task(continuation, status));
        }
        Poll::Pending
    }

    fn handle_wakeup(&mut self, wakeup: Wakeup) -> Result<(), RenderError> {
        match wakeup {
            Wakeup::Work(work) => work(),
            Wakeup::Task(continuation, status) => self.complete_task(continuation, status)?,
            Wakeup::RenderRequested => {}
        }
        self.process_pending_renders()
    }
}

impl<D: DisplaySurface> Drop for Renderer<D> {
    fn drop(&mut self) {
        for mut state in self.registry.drain() {
            if let Err(error) = state.component.dispose() {
                tracing::warn!(
                    component = %state.id(),
                    error = %error,
                    "dispose failed during renderer teardown"
                );
            }
        }
    }
}

/// Active render-to-quiescence pass. Dropping it ends the pass.
struct QuiescencePass<'a, D: DisplaySurface> {
    renderer: &'a mut Renderer<D>,
}

impl<D: DisplaySurface> QuiescencePass<'_, D> {
    async fn run(&mut self, id: ComponentId, parameters: Parameters) -> Result<(), RenderError> {
        let renderer = &mut *self.renderer;
        renderer.render_root(id, parameters)?;

        loop {
            let step = poll_fn(|cx| {
                if let Poll::Ready(settled) = renderer.tasks.poll_quiescence(cx) {
                    return Poll::Ready(settled.map(Ok));
                }
                renderer.poll_wakeup(cx).map(|wakeup| Some(Err(wakeup)))
            })
            .await;
            match step {
                None => return Ok(()),
                Some(Ok((continuation, status))) => {
                    renderer.complete_task(continuation, status)?;
                    renderer.process_pending_renders()?;
                }
                Some(Err(wakeup)) => renderer.handle_wakeup(wakeup)?,
            }
        }
    }
}

impl<D: DisplaySurface> Drop for QuiescencePass<'_, D> {
    fn drop(&mut self) {
        self.renderer.tasks.end_quiescence();
    }
}

/// Diff side effects for one component render: attaches and re-parameterizes
/// children and assigns handler identities. Removals and settled completions
/// are collected and applied once the diff is done.
struct FrameMaterializer<'a> {
    owner: ComponentId,
    registry: &'a mut ComponentRegistry,
    handlers: &'a mut EventBindingTable,
    tasks: &'a mut TaskTracker,
    wake: &'a Arc<RenderWake>,
    dispatcher: &'a Dispatcher,
    removed_components: Vec<ComponentId>,
    retired_handlers: Vec<EventHandlerId>,
    settled: Vec<(Continuation, TaskStatus)>,
}

impl FrameMaterializer<'_> {
    fn attach_child(&mut self, frame: &mut Frame) {
        let Frame::Component {
            component_type,
            parameters,
            component_id,
        } = frame
        else {
            return;
        };
        let (wake, dispatcher) = (self.wake, self.dispatcher);
        let child = self
            .registry
            .attach(component_type.instantiate(), Some(self.owner), |id| {
                RenderHandle::new(id, Arc::clone(wake), dispatcher.clone())
            });
        *component_id = Some(child);
        let parameters = parameters.clone();
        self.set_child_parameters(child, parameters);
    }

    fn set_child_parameters(&mut self, child: ComponentId, parameters: Parameters) {
        let Some(state) = self.registry.lookup_mut(child) else {
            return;
        };
        let continuation = Continuation::ParameterUpdate { component: child };
        match state.component.receive_parameters(parameters).try_settle() {
            Ok(status) => self.settled.push((continuation, status)),
            Err(pending) => self.tasks.track(continuation, pending),
        }
    }
}

impl DiffObserver for FrameMaterializer<'_> {
    fn frame_inserted(&mut self, frame: &mut Frame) {
        if let Frame::Attribute {
            value: AttributeValue::Handler(callback),
            handler_id,
            ..
        } = &mut *frame
        {
            *handler_id = Some(self.handlers.assign(callback, self.owner));
        } else if frame.kind() == FrameKind::Component {
            self.attach_child(frame);
        }
    }

    fn frame_retained(&mut self, old: &Frame, new: &mut Frame) {
        match (old, new) {
            (
                Frame::Attribute {
                    value: old_value,
                    handler_id: old_id,
                    ..
                },
                Frame::Attribute {
                    value, handler_id, ..
                },
            ) => match (*old_id, value.as_handler()) {
                (Some(old_id), Some(callback)) => {
                    let unchanged = old_value
                        .as_handler()
                        .is_some_and(|previous| previous.same_callback(callback));
                    if unchanged {
                        *handler_id = Some(old_id);
                    } else {
                        let new_id = self.handlers.assign(callback, self.owner);
                        self.handlers.track_replacement(old_id, new_id);
                        self.retired_handlers.push(old_id);
                        *handler_id = Some(new_id);
                    }
                }
                (Some(old_id), None) => self.retired_handlers.push(old_id),
                (None, Some(callback)) => {
                    *handler_id = Some(self.handlers.assign(callback, self.owner));
                }
                (None, None) => {}
            },
            (
                Frame::Component {
                    parameters: old_parameters,
                    component_id: old_id,
                    ..
                },
                Frame::Component {
                    parameters,
                    component_id,
                    ..
                },
            ) => {
                *component_id = *old_id;
                if let Some(child) = *old_id {
                    if !parameters.unchanged_from(old_parameters) {
                        let parameters = parameters.clone();
                        self.set_child_parameters(child, parameters);
                    }
                }
            }
            _ => {}
        }
    }

    fn frame_removed(&mut self, frame: &Frame) {
        if let Some(handler) = frame.handler_id() {
            self.retired_handlers.push(handler);
        }
        if let Some(child) = frame.component_id() {
            self.removed_components.push(child);
        }
    }
}

/// Make the element owning `handler` reflect the field value the client
/// already shows by overwriting its mirroring attribute.
///
/// An element without that attribute is left alone: the display holds the same
/// frames, and inserting one here would shift every later diff index.
fn apply_field_value(frames: &mut [Frame], handler: EventHandlerId, value: &FieldValue) -> bool {
    let Some(handler_index) = frames
        .iter()
        .position(|frame| frame.handler_id() == Some(handler))
    else {
        return false;
    };
    let Some(element_index) = frames[..handler_index]
        .iter()
        .rposition(|frame| frame.kind() != FrameKind::Attribute)
    else {
        return false;
    };
    if frames[element_index].kind() != FrameKind::Element {
        return false;
    }

    let name = value.attribute_name();
    let attributes = frames[element_index + 1..]
        .iter_mut()
        .take_while(|frame| frame.kind() == FrameKind::Attribute);
    for frame in attributes {
        if frame.attribute_name() != Some(name) {
            continue;
        }
        if let Frame::Attribute { value: current, .. } = frame {
            *current = value.to_attribute_value();
        }
        return true;
    }
    false
}

/// Components with a diff in `batch`, deduplicated, in render order.
fn rendered_components(batch: &RenderBatch) -> Vec<ComponentId> {
    let mut rendered = Vec::with_capacity(batch.updated_components.len());
    for diff in &batch.updated_components {
        if !rendered.contains(&diff.component_id) {
            rendered.push(diff.component_id);
        }
    }
    rendered
}
