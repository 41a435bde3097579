#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::anyhow;
use tokio::sync::oneshot;

use tape_render::{
    Completion, Component, ComponentError, ComponentId, ComponentType, DisplaySurface,
    EventArgs, EventCallback, EventHandlerId, ExceptionHandler, Frame, Parameters, RenderBatch,
    RenderError, RenderHandle, RenderTreeBuilder, Renderer,
};

/// How [`RecordingDisplay`] acknowledges batches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AckMode {
    Immediate,
    /// Held until [`RecordingDisplay::release_ack`].
    Deferred,
    Fail,
}

/// Display that keeps every batch and replays diffs into per-component
/// mirrors, the way a real client would.
pub struct RecordingDisplay {
    pub batches: Vec<RenderBatch>,
    pub mirrors: HashMap<ComponentId, Vec<Frame>>,
    pub mode: AckMode,
    acks: Vec<oneshot::Sender<Result<(), String>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::with_mode(AckMode::Immediate)
    }

    pub fn with_mode(mode: AckMode) -> Self {
        Self {
            batches: Vec::new(),
            mirrors: HashMap::new(),
            mode,
            acks: Vec::new(),
        }
    }

    pub fn mirror(&self, id: ComponentId) -> &[Frame] {
        self.mirrors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_batch(&self) -> &RenderBatch {
        self.batches.last().expect("at least one batch delivered")
    }

    pub fn pending_acks(&self) -> usize {
        self.acks.len()
    }

    pub fn release_ack(&mut self) {
        let ack = self.acks.remove(0);
        let _ = ack.send(Ok(()));
    }

    pub fn fail_ack(&mut self, message: &str) {
        let ack = self.acks.remove(0);
        let _ = ack.send(Err(message.to_string()));
    }
}

impl DisplaySurface for RecordingDisplay {
    fn update_display(&mut self, batch: &RenderBatch) -> Completion {
        for diff in &batch.updated_components {
            let frames = self.mirrors.entry(diff.component_id).or_default();
            if let Err(error) = diff.apply(frames, &batch.reference_frames) {
                return Completion::faulted(anyhow!("replay failed: {error}"));
            }
        }
        for id in &batch.disposed_component_ids {
            self.mirrors.remove(id);
        }
        self.batches.push(batch.clone());

        match self.mode {
            AckMode::Immediate => Completion::completed(),
            AckMode::Fail => Completion::faulted(anyhow!("display offline")),
            AckMode::Deferred => {
                let (ack, acked) = oneshot::channel();
                self.acks.push(ack);
                Completion::from_fallible(async move {
                    match acked.await {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(message)) => Err(anyhow!(message)),
                        Err(_) => Err(anyhow!("acknowledgment dropped")),
                    }
                })
            }
        }
    }
}

/// Exception policy that records every failure and keeps rendering.
#[derive(Clone, Default)]
pub struct RecordedErrors(Rc<RefCell<Vec<RenderError>>>);

impl RecordedErrors {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<RenderError> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl ExceptionHandler for RecordedErrors {
    fn handle_exception(&mut self, error: RenderError) -> Result<(), RenderError> {
        self.0.borrow_mut().push(error);
        Ok(())
    }
}

/// Shared, ordered log of lifecycle calls.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|seen| *seen == entry).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.count(entry) > 0
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.borrow().iter().position(|seen| seen == entry)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Parameter updates parked until the test opens the gate.
#[derive(Clone, Default)]
pub struct Gate(Rc<RefCell<Vec<oneshot::Sender<()>>>>);

impl Gate {
    fn wait(&self) -> oneshot::Receiver<()> {
        let (open, opened) = oneshot::channel();
        self.0.borrow_mut().push(open);
        opened
    }

    pub fn waiting(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn open_all(&self) {
        for open in self.0.borrow_mut().drain(..) {
            let _ = open.send(());
        }
    }
}

/// Slot a [`View`] fills with its handle during `configure`.
pub type HandleSlot = Rc<RefCell<Option<RenderHandle>>>;

pub fn handle_in(slot: &HandleSlot) -> RenderHandle {
    slot.borrow().clone().expect("component configured")
}

#[derive(Clone)]
pub enum UpdateMode {
    /// Request a render and complete synchronously.
    Sync,
    /// Yield once, then request a render.
    Yielding,
    /// Wait for the gate, then request a render.
    Gated(Gate),
    /// Complete as canceled without rendering.
    Canceled,
    Faulting,
}

pub type RenderScript =
    Rc<dyn Fn(&Parameters, &mut RenderTreeBuilder) -> Result<(), ComponentError>>;

/// Component whose output comes from a script; every lifecycle call is
/// journaled as `"{name}:{call}"`.
#[derive(Clone)]
pub struct View {
    name: &'static str,
    journal: Journal,
    script: RenderScript,
    update: UpdateMode,
    slot: Option<HandleSlot>,
    fail_dispose: bool,
    handle: Option<RenderHandle>,
    parameters: Parameters,
}

impl View {
    pub fn new<F>(name: &'static str, journal: &Journal, script: F) -> Self
    where
        F: Fn(&Parameters, &mut RenderTreeBuilder) -> Result<(), ComponentError> + 'static,
    {
        Self {
            name,
            journal: journal.clone(),
            script: Rc::new(script),
            update: UpdateMode::Sync,
            slot: None,
            fail_dispose: false,
            handle: None,
            parameters: Parameters::new(),
        }
    }

    pub fn with_update(mut self, update: UpdateMode) -> Self {
        self.update = update;
        self
    }

    pub fn with_slot(mut self, slot: &HandleSlot) -> Self {
        self.slot = Some(Rc::clone(slot));
        self
    }

    pub fn with_failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }

    /// Component type instantiating fresh copies of this view.
    pub fn into_type(self) -> ComponentType {
        let name = self.name;
        ComponentType::new(name, move || Box::new(self.clone()) as Box<dyn Component>)
    }

    fn record(&self, call: &str) {
        self.journal.record(format!("{}:{call}", self.name));
    }
}

impl Component for View {
    fn configure(&mut self, handle: RenderHandle) {
        self.record("configure");
        if let Some(slot) = &self.slot {
            *slot.borrow_mut() = Some(handle.clone());
        }
        self.handle = Some(handle);
    }

    fn receive_parameters(&mut self, parameters: Parameters) -> Completion {
        self.record("parameters");
        self.parameters = parameters;
        let handle = self.handle.clone().expect("configured before parameters");
        match &self.update {
            UpdateMode::Sync => {
                Completion::from_result(handle.request_render().map_err(ComponentError::from))
            }
            UpdateMode::Yielding => Completion::from_fallible(async move {
                tokio::task::yield_now().await;
                handle.request_render()?;
                Ok::<(), ComponentError>(())
            }),
            UpdateMode::Gated(gate) => {
                let opened = gate.wait();
                Completion::from_fallible(async move {
                    opened.await.map_err(|_| anyhow!("gate dropped"))?;
                    handle.request_render()?;
                    Ok::<(), ComponentError>(())
                })
            }
            UpdateMode::Canceled => Completion::canceled(),
            UpdateMode::Faulting => Completion::faulted(anyhow!("bad parameters")),
        }
    }

    fn render(&mut self, builder: &mut RenderTreeBuilder) -> Result<(), ComponentError> {
        self.record("render");
        (self.script)(&self.parameters, builder)
    }

    fn handle_event(&mut self, callback: &EventCallback, args: &EventArgs) -> Completion {
        self.record("handle_event");
        callback.invoke(args)
    }

    fn after_render(&mut self, first_render: bool) -> Completion {
        self.record(&format!("after_render:{first_render}"));
        Completion::completed()
    }

    fn dispose(&mut self) -> Result<(), ComponentError> {
        self.record("dispose");
        if self.fail_dispose {
            return Err(anyhow!("dispose exploded"));
        }
        Ok(())
    }
}

/// Handler identities stamped into `frames`, in order.
pub fn handler_ids(frames: &[Frame]) -> Vec<EventHandlerId> {
    frames.iter().filter_map(Frame::handler_id).collect()
}

/// Child identities referenced from `frames`, in order.
pub fn child_ids(frames: &[Frame]) -> Vec<ComponentId> {
    frames.iter().filter_map(Frame::component_id).collect()
}

pub fn committed(renderer: &Renderer<RecordingDisplay>, id: ComponentId) -> Vec<Frame> {
    renderer
        .component(id)
        .map(|state| state.frames().to_vec())
        .unwrap_or_default()
}

pub fn first_handler(renderer: &Renderer<RecordingDisplay>, id: ComponentId) -> EventHandlerId {
    handler_ids(&committed(renderer, id))
        .into_iter()
        .next()
        .expect("component rendered a handler")
}

pub fn first_child(renderer: &Renderer<RecordingDisplay>, id: ComponentId) -> ComponentId {
    child_ids(&committed(renderer, id))
        .into_iter()
        .next()
        .expect("component rendered a child")
}

/// Renderer whose display keeps every batch.
pub fn renderer() -> Renderer<RecordingDisplay> {
    Renderer::new(RecordingDisplay::new())
}
