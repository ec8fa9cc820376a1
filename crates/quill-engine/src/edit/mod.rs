//! Page edits that outlive a single gesture: splitting strokes under the
//! segment eraser, and the undo/redo history over an [`InkPage`].
//!
//! [`InkPage`]: crate::ink::InkPage

mod history;
mod split;

pub use history::{InkAction, InkHistory, DEFAULT_MAX_ACTIONS};
pub use split::{
    apply_stroke_split, compute_split_candidates, find_touched_indices, restore_stroke_split,
    split_stroke, SplitCandidate,
};
