use std::collections::HashSet;

use crate::coords::Vec2;
use crate::ink::StrokeId;
use crate::paint::Argb;

/// Hover indicator; center in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverPreview {
    pub center: Vec2,
    pub radius: f32,
    pub color: Argb,
    pub alpha: f32,
}

/// Non-committed decorations drawn on top of ink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub selected: HashSet<StrokeId>,
    /// Lasso polygon in page units.
    pub lasso: Vec<Vec2>,
    pub hover: Option<HoverPreview>,
}

impl OverlayState {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.lasso.is_empty() && self.hover.is_none()
    }
}
