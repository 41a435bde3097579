//! Display surface contract.

use crate::core::completion::Completion;
use crate::render::batch::RenderBatch;

/// External collaborator that applies render batches to a real display (an
/// in-process buffer, a remote client, a DOM).
pub trait DisplaySurface {
    /// Apply `batch`, the full and only description of changes since the
    /// previous call.
    ///
    /// The batch must not be retained past the call; copy what is needed. The
    /// returned completion acknowledges the batch. The renderer will not issue
    /// another batch until this acknowledgment has settled.
    fn update_display(&mut self, batch: &RenderBatch) -> Completion;
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Box<D> {
    fn update_display(&mut self, batch: &RenderBatch) -> Completion {
        (**self).update_display(batch)
    }
}
