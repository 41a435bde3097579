//! Positional frame diffing.
//!
//! Old and new sequences are compared index by index. A frame of the same
//! shape (same element tag, attribute name, component type, or both text /
//! both region) is updated in place; anything else is replaced. Component
//! frames are opaque here: a child's output is diffed separately under its
//! own identity when the child renders.

use thiserror::Error;

use crate::render::frame::{Frame, FrameKind};
use crate::runtime::component_registry::ComponentId;

/// One edit operation. Indices address the frame sequence as it stands after
/// all preceding edits of the same diff have been applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderTreeEdit {
    /// Replace a frame with a same-shaped one (new text, subtree length, or
    /// child parameters).
    UpdateFrame {
        index: usize,
        reference_frame_index: usize,
    },
    /// Replace an attribute's value; also how handler identities are assigned
    /// to or cleared from an attribute.
    SetAttribute {
        index: usize,
        reference_frame_index: usize,
    },
    InsertFrame {
        index: usize,
        reference_frame_index: usize,
    },
    RemoveFrame {
        index: usize,
    },
}

/// Edits that transform one component's previous output into its new output.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTreeDiff {
    pub component_id: ComponentId,
    pub edits: Vec<RenderTreeEdit>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ReplayError {
    #[error("edit {edit} targets index {index} but the sequence holds {len} frames")]
    IndexOutOfRange { edit: usize, index: usize, len: usize },

    #[error("edit {edit} references missing reference frame {reference}")]
    MissingReferenceFrame { edit: usize, reference: usize },
}

impl RenderTreeDiff {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Replay the edits against `frames`, the component's previously
    /// committed output, resolving reference indices in `reference_frames`.
    pub fn apply(
        &self,
        frames: &mut Vec<Frame>,
        reference_frames: &[Frame],
    ) -> Result<(), ReplayError> {
        for (edit_index, edit) in self.edits.iter().enumerate() {
            let reference = |reference: usize| {
                reference_frames
                    .get(reference)
                    .cloned()
                    .ok_or(ReplayError::MissingReferenceFrame {
                        edit: edit_index,
                        reference,
                    })
            };
            let out_of_range = |index: usize, len: usize| ReplayError::IndexOutOfRange {
                edit: edit_index,
                index,
                len,
            };

            match *edit {
                RenderTreeEdit::UpdateFrame {
                    index,
                    reference_frame_index,
                }
                | RenderTreeEdit::SetAttribute {
                    index,
                    reference_frame_index,
                } => {
                    let frame = reference(reference_frame_index)?;
                    let len = frames.len();
                    let slot = frames.get_mut(index).ok_or(out_of_range(index, len))?;
                    *slot = frame;
                }
                RenderTreeEdit::InsertFrame {
                    index,
                    reference_frame_index,
                } => {
                    if index > frames.len() {
                        return Err(out_of_range(index, frames.len()));
                    }
                    frames.insert(index, reference(reference_frame_index)?);
                }
                RenderTreeEdit::RemoveFrame { index } => {
                    if index >= frames.len() {
                        return Err(out_of_range(index, frames.len()));
                    }
                    frames.remove(index);
                }
            }
        }
        Ok(())
    }
}

/// Side effects of a diff: the renderer attaches and disposes children and
/// assigns and retires handler identities through this.
pub trait DiffObserver {
    /// `frame` appears without a retained counterpart. Called before the frame
    /// is copied into the batch, so identities stamped here are visible there.
    fn frame_inserted(&mut self, frame: &mut Frame);

    /// `new` continues the logical node `old` held at the same position.
    fn frame_retained(&mut self, old: &Frame, new: &mut Frame);

    /// `frame` is gone from the output.
    fn frame_removed(&mut self, frame: &Frame);
}

/// Compute edits from `old` to `new`, appending them to `edits` and every frame
/// the edits reference to `reference_frames`.
pub fn diff_frames<O: DiffObserver + ?Sized>(
    old: &[Frame],
    new: &mut [Frame],
    reference_frames: &mut Vec<Frame>,
    edits: &mut Vec<RenderTreeEdit>,
    observer: &mut O,
) {
    let shared = old.len().min(new.len());

    for index in 0..shared {
        let old_frame = &old[index];
        let new_frame = &mut new[index];
        if old_frame.same_shape(new_frame) {
            observer.frame_retained(old_frame, new_frame);
            if old_frame != &*new_frame {
                let reference_frame_index = push_reference(reference_frames, new_frame);
                edits.push(if new_frame.kind() == FrameKind::Attribute {
                    RenderTreeEdit::SetAttribute {
                        index,
                        reference_frame_index,
                    }
                } else {
                    RenderTreeEdit::UpdateFrame {
                        index,
                        reference_frame_index,
                    }
                });
            }
        } else {
            observer.frame_removed(old_frame);
            observer.frame_inserted(new_frame);
            let reference_frame_index = push_reference(reference_frames, new_frame);
            edits.push(RenderTreeEdit::RemoveFrame { index });
            edits.push(RenderTreeEdit::InsertFrame {
                index,
                reference_frame_index,
            });
        }
    }

    for (index, new_frame) in new.iter_mut().enumerate().skip(shared) {
        observer.frame_inserted(new_frame);
        let reference_frame_index = push_reference(reference_frames, new_frame);
        edits.push(RenderTreeEdit::InsertFrame {
            index,
            reference_frame_index,
        });
    }

    let new_len = new.len();
    for old_frame in &old[shared..] {
        observer.frame_removed(old_frame);
        edits.push(RenderTreeEdit::RemoveFrame { index: new_len });
    }
}

fn push_reference(reference_frames: &mut Vec<Frame>, frame: &Frame) -> usize {
    reference_frames.push(frame.clone());
    reference_frames.len() - 1
}
