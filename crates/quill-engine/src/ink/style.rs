use std::hash::{Hash, Hasher};

use crate::paint::Argb;

/// Alpha multiplier applied to highlighter strokes.
pub const HIGHLIGHTER_ALPHA: f32 = 0.35;

/// Extra alpha factor for predicted-tail overlays.
pub const PREDICTED_ALPHA_FACTOR: f32 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pen,
    Highlighter,
    Eraser,
}

/// Immutable stroke appearance. Also serves as the current brush.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeStyle {
    pub tool: Tool,
    pub color: Argb,
    pub base_width: f32,
    pub min_width_factor: f32,
    pub max_width_factor: f32,
    pub smoothing_level: f32,
    pub end_taper_strength: f32,
    pub nib_rotation: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: Argb::BLACK,
            base_width: 2.0,
            min_width_factor: 0.85,
            max_width_factor: 1.15,
            smoothing_level: 0.35,
            end_taper_strength: 0.35,
            nib_rotation: false,
        }
    }
}

impl StrokeStyle {
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    pub fn with_color(mut self, color: Argb) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, base_width: f32) -> Self {
        self.base_width = base_width;
        self
    }

    /// Alpha multiplier the renderer applies on top of the color's own alpha.
    pub fn render_alpha(&self) -> f32 {
        match self.tool {
            Tool::Highlighter => HIGHLIGHTER_ALPHA,
            Tool::Pen | Tool::Eraser => 1.0,
        }
    }

    /// Widest width the geometry builder can emit for this style.
    pub fn max_rendered_width(&self) -> f32 {
        self.base_width * self.max_width_factor.max(1.0)
    }
}

impl Hash for StrokeStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tool.hash(state);
        self.color.hash(state);
        self.base_width.to_bits().hash(state);
        self.min_width_factor.to_bits().hash(state);
        self.max_width_factor.to_bits().hash(state);
        self.smoothing_level.to_bits().hash(state);
        self.end_taper_strength.to_bits().hash(state);
        self.nib_rotation.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pen() {
        let s = StrokeStyle::default();
        assert_eq!(s.tool, Tool::Pen);
        assert_eq!(s.color, Argb(0xFF00_0000));
        assert_eq!(s.base_width, 2.0);
        assert_eq!(s.render_alpha(), 1.0);
    }

    #[test]
    fn highlighter_is_translucent() {
        let s = StrokeStyle::default().with_tool(Tool::Highlighter);
        assert_eq!(s.render_alpha(), HIGHLIGHTER_ALPHA);
    }
}
