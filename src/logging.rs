//! Render/debug logging helpers.
//!
//! Nothing here installs a subscriber; hosts wire `tracing` output themselves.
//! The env flags are read once per process.

use once_cell::sync::Lazy;

use crate::config::EnvConfig;
use crate::core::event::EventHandlerId;
use crate::render::batch::RenderBatch;
use crate::runtime::component_registry::ComponentId;

static ENV: Lazy<EnvConfig> = Lazy::new(EnvConfig::from_env);

pub fn batch_logging_enabled() -> bool {
    ENV.debug_batches
}

pub fn event_logging_enabled() -> bool {
    ENV.debug_events
}

pub(crate) fn log_batch(sequence: u64, batch: &RenderBatch) {
    if !batch_logging_enabled() {
        return;
    }
    let edits: usize = batch.updated_components.iter().map(|diff| diff.edits.len()).sum();
    tracing::debug!(
        sequence,
        diffs = batch.updated_components.len(),
        edits,
        reference_frames = batch.reference_frames.len(),
        disposed_components = ?batch.disposed_component_ids,
        disposed_handlers = ?batch.disposed_event_handler_ids,
        "render batch"
    );
}

pub(crate) fn log_event(
    requested: EventHandlerId,
    resolved: EventHandlerId,
    receiver: ComponentId,
) {
    if !event_logging_enabled() {
        return;
    }
    tracing::debug!(%requested, %resolved, %receiver, "dispatch event");
}
