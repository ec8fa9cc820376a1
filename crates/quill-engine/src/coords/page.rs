use super::{Rect, Vec2};

/// Page extent in page units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pages without a positive extent impose no bounds.
    #[inline]
    pub fn is_bounded(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Clamps a page point into `[0, width] x [0, height]`.
    pub fn clamp(self, p: Vec2) -> Vec2 {
        if !self.is_bounded() {
            return p;
        }
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    /// Inclusive containment with `tolerance` page units of slack on every edge.
    pub fn contains_with_tolerance(self, p: Vec2, tolerance: f32) -> bool {
        if !self.is_bounded() {
            return true;
        }
        p.x >= -tolerance
            && p.y >= -tolerance
            && p.x <= self.width + tolerance
            && p.y <= self.height + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pins_to_corner() {
        let page = PageSize::new(100.0, 100.0);
        assert_eq!(page.clamp(Vec2::new(160.0, 180.0)), Vec2::new(100.0, 100.0));
        assert_eq!(page.clamp(Vec2::new(-4.0, 50.0)), Vec2::new(0.0, 50.0));
    }

    #[test]
    fn tolerance_accepts_near_edge() {
        let page = PageSize::new(100.0, 100.0);
        assert!(page.contains_with_tolerance(Vec2::new(101.0, 50.0), 12.0));
        assert!(!page.contains_with_tolerance(Vec2::new(150.0, 150.0), 12.0));
    }

    #[test]
    fn unbounded_page_accepts_everything() {
        let page = PageSize::new(0.0, 0.0);
        assert!(page.contains_with_tolerance(Vec2::new(1e6, -1e6), 0.0));
        assert_eq!(page.clamp(Vec2::new(1e6, -1e6)), Vec2::new(1e6, -1e6));
    }
}
