//! Render batches and the pooled builder that accumulates them during a flush.

use std::collections::VecDeque;

use crate::core::event::EventHandlerId;
use crate::render::diff::{RenderTreeDiff, RenderTreeEdit};
use crate::render::frame::Frame;
use crate::runtime::component_registry::ComponentId;

/// Everything that changed during one flush, delivered atomically to the
/// display surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderBatch {
    /// One diff per component render, in render order.
    pub updated_components: Vec<RenderTreeDiff>,
    /// Frames referenced by `reference_frame_index` in the diffs.
    pub reference_frames: Vec<Frame>,
    pub disposed_component_ids: Vec<ComponentId>,
    pub disposed_event_handler_ids: Vec<EventHandlerId>,
}

impl RenderBatch {
    pub fn is_empty(&self) -> bool {
        self.updated_components.is_empty()
            && self.disposed_component_ids.is_empty()
            && self.disposed_event_handler_ids.is_empty()
    }

    /// Diffs produced for `component_id`, in render order.
    pub fn diffs_for(&self, component_id: ComponentId) -> impl Iterator<Item = &RenderTreeDiff> {
        self.updated_components
            .iter()
            .filter(move |diff| diff.component_id == component_id)
    }

    fn clear(&mut self) {
        self.updated_components.clear();
        self.reference_frames.clear();
        self.disposed_component_ids.clear();
        self.disposed_event_handler_ids.clear();
    }
}

/// In-progress batch plus the disposal queue drained between component renders.
#[derive(Debug, Default)]
pub(crate) struct BatchBuilder {
    batch: RenderBatch,
    spare: Option<RenderBatch>,
    edit_buffers: Vec<Vec<RenderTreeEdit>>,
    disposal_queue: VecDeque<ComponentId>,
}

impl BatchBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reference_frames_mut(&mut self) -> &mut Vec<Frame> {
        &mut self.batch.reference_frames
    }

    /// Pooled edit buffer for the next diff.
    pub(crate) fn take_edit_buffer(&mut self) -> Vec<RenderTreeEdit> {
        self.edit_buffers.pop().unwrap_or_default()
    }

    pub(crate) fn push_diff(&mut self, component_id: ComponentId, edits: Vec<RenderTreeEdit>) {
        self.batch
            .updated_components
            .push(RenderTreeDiff { component_id, edits });
    }

    pub(crate) fn queue_disposal(&mut self, component_id: ComponentId) {
        self.disposal_queue.push_back(component_id);
    }

    pub(crate) fn next_disposal(&mut self) -> Option<ComponentId> {
        self.disposal_queue.pop_front()
    }

    pub(crate) fn has_pending_disposals(&self) -> bool {
        !self.disposal_queue.is_empty()
    }

    pub(crate) fn record_disposed_component(&mut self, component_id: ComponentId) {
        if !self.batch.disposed_component_ids.contains(&component_id) {
            self.batch.disposed_component_ids.push(component_id);
        }
    }

    pub(crate) fn record_disposed_handler(&mut self, handler_id: EventHandlerId) {
        self.batch.disposed_event_handler_ids.push(handler_id);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Hand out the accumulated batch and reset for the next flush.
    pub(crate) fn take_batch(&mut self) -> RenderBatch {
        let next = self.spare.take().unwrap_or_default();
        std::mem::replace(&mut self.batch, next)
    }

    /// Return a delivered batch's buffers to the pool.
    pub(crate) fn recycle(&mut self, mut batch: RenderBatch) {
        for diff in batch.updated_components.drain(..) {
            let mut edits = diff.edits;
            edits.clear();
            self.edit_buffers.push(edits);
        }
        batch.clear();
        let idle = self.batch.is_empty() && self.batch.reference_frames.is_empty();
        if idle && self.batch.reference_frames.capacity() < batch.reference_frames.capacity() {
            std::mem::swap(&mut self.batch, &mut batch);
        }
        if self.spare.is_none() {
            self.spare = Some(batch);
        }
    }
}
