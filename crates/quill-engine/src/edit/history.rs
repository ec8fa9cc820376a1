use std::collections::VecDeque;

use log::debug;

use crate::ink::{InkPage, Stroke};

use super::split::{apply_stroke_split, restore_stroke_split};

pub const DEFAULT_MAX_ACTIONS: usize = 50;

/// One undoable page edit.
#[derive(Debug, Clone, PartialEq)]
pub enum InkAction {
    AddStroke(Stroke),
    /// `index` is refreshed from the page when the action is applied so
    /// undo puts the stroke back at its z-position.
    RemoveStroke { stroke: Stroke, index: usize },
    SplitStroke {
        original: Stroke,
        segments: Vec<Stroke>,
        insertion_index: usize,
    },
    /// Lasso move/resize: the same ids before and after.
    TransformStrokes { before: Vec<Stroke>, after: Vec<Stroke> },
}

impl InkAction {
    pub fn remove(stroke: Stroke) -> Self {
        Self::RemoveStroke { stroke, index: 0 }
    }

    pub fn split(original: Stroke, segments: Vec<Stroke>) -> Self {
        Self::SplitStroke {
            original,
            segments,
            insertion_index: 0,
        }
    }

    fn forward(&mut self, page: &mut InkPage) -> bool {
        match self {
            InkAction::AddStroke(stroke) => {
                page.add(stroke.clone());
                true
            }
            InkAction::RemoveStroke { stroke, index } => match page.position(stroke.id) {
                Some(i) => {
                    *index = i;
                    page.remove(stroke.id);
                    true
                }
                None => false,
            },
            InkAction::SplitStroke {
                original,
                segments,
                insertion_index,
            } => match apply_stroke_split(page, original, segments) {
                Some(i) => {
                    *insertion_index = i;
                    true
                }
                None => false,
            },
            InkAction::TransformStrokes { after, .. } => {
                for s in after.iter() {
                    page.add(s.clone());
                }
                true
            }
        }
    }

    fn backward(&self, page: &mut InkPage) {
        match self {
            InkAction::AddStroke(stroke) => {
                page.remove(stroke.id);
            }
            InkAction::RemoveStroke { stroke, index } => {
                page.insert(*index, stroke.clone());
            }
            InkAction::SplitStroke {
                original,
                segments,
                insertion_index,
            } => restore_stroke_split(page, original, segments, *insertion_index),
            InkAction::TransformStrokes { before, .. } => {
                for s in before {
                    page.add(s.clone());
                }
            }
        }
    }
}

/// Bounded undo/redo stacks over page edits.
#[derive(Debug)]
pub struct InkHistory {
    undo: VecDeque<InkAction>,
    redo: Vec<InkAction>,
    max_actions: usize,
}

impl Default for InkHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ACTIONS)
    }
}

impl InkHistory {
    pub fn new(max_actions: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_actions: max_actions.max(1),
        }
    }

    /// Applies `action` to `page` and records it. Clears the redo stack.
    ///
    /// Returns `false` (and records nothing) when the action does not
    /// apply, e.g. removing a stroke that is not on the page.
    pub fn apply(&mut self, page: &mut InkPage, mut action: InkAction) -> bool {
        if !action.forward(page) {
            debug!("ink history: action did not apply; not recorded");
            return false;
        }
        self.push_undo(action);
        self.redo.clear();
        true
    }

    pub fn undo(&mut self, page: &mut InkPage) -> bool {
        let Some(action) = self.undo.pop_back() else {
            return false;
        };
        action.backward(page);
        self.redo.push(action);
        true
    }

    pub fn redo(&mut self, page: &mut InkPage) -> bool {
        let Some(mut action) = self.redo.pop() else {
            return false;
        };
        action.forward(page);
        self.push_undo(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, action: InkAction) {
        self.undo.push_back(action);
        while self.undo.len() > self.max_actions {
            self.undo.pop_front();
        }
    }
}
