//! Pointer classification: stylus, finger, or unknown.
//!
//! The result is computed once per sample and carried through the router as
//! a closed enum; nothing downstream re-inspects platform tool codes.

mod classifier;

pub use classifier::{event_is_finger_only, PointerClass, PointerClassifier, PointerKind};
