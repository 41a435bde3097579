//! Render model: frames, the builder components write into, diffs and batches.

pub mod batch;
pub mod builder;
pub mod diff;
pub mod frame;

pub use batch::RenderBatch;
pub use builder::RenderTreeBuilder;
pub use diff::{diff_frames, DiffObserver, RenderTreeDiff, RenderTreeEdit, ReplayError};
pub use frame::{AttributeValue, Frame, FrameKind};
