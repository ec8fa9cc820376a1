use super::{Rect, Vec2, Viewport};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 4.0;

/// Page ↔ screen mapping: `screen = page * zoom + pan`.
///
/// Read by every component; only the gesture router's transform handler
/// mutates it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        zoom: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pan_x,
            pan_y,
        }
    }

    #[inline]
    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.pan_x, self.pan_y)
    }

    #[inline]
    pub fn page_to_screen(&self, p: Vec2) -> Vec2 {
        p * self.zoom + self.pan()
    }

    #[inline]
    pub fn screen_to_page(&self, s: Vec2) -> Vec2 {
        (s - self.pan()) / self.zoom
    }

    /// Converts a screen-space length to page units; guards against a zero zoom.
    #[inline]
    pub fn screen_len_to_page(&self, len: f32, min_zoom: f32) -> f32 {
        len / self.zoom.max(min_zoom)
    }

    /// Page-space rect currently covered by `viewport`.
    pub fn visible_page_rect(&self, viewport: Viewport) -> Rect {
        let min = self.screen_to_page(Vec2::zero());
        let max = self.screen_to_page(Vec2::new(viewport.width, viewport.height));
        Rect::from_min_max(min, max)
    }

    /// Applies an incremental gesture: zoom by `zoom_change` about `centroid`
    /// (screen px), then translate by `pan_change`.
    ///
    /// The zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`; the centroid stays fixed
    /// on screen even when the clamp absorbs part of the change.
    pub fn apply_gesture(&mut self, zoom_change: f32, pan_change: Vec2, centroid: Vec2) {
        let target = (self.zoom * zoom_change).clamp(MIN_ZOOM, MAX_ZOOM);
        let applied = target / self.zoom;
        let pan = centroid - (centroid - self.pan()) * applied + pan_change;
        self.zoom = target;
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }
}
