use super::Vec2;

/// Axis-aligned rectangle (top-left origin, +Y down).
///
/// Stroke bounds are stored as `Rect` in page units. Zero-width or
/// zero-height rects are valid bounds (a perfectly horizontal line has one).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Tight bounds of a point set, or `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let (mut min, mut max) = (first, first);
        for p in it {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_min_max(min, max))
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.min().midpoint(self.max())
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    /// True when the rect has no positive area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }

    /// Grows the rect by `amount` on every side.
    #[inline]
    pub fn expand(self, amount: f32) -> Self {
        Self::new(
            self.origin.x - amount,
            self.origin.y - amount,
            self.size.x + amount * 2.0,
            self.size.y + amount * 2.0,
        )
    }

    pub fn union(self, other: Rect) -> Self {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        Self::from_min_max(
            Vec2::new(a0.x.min(b0.x), a0.y.min(b0.y)),
            Vec2::new(a1.x.max(b1.x), a1.y.max(b1.y)),
        )
    }

    /// Inclusive overlap test: touching edges count.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        a0.x <= b1.x && a1.x >= b0.x && a0.y <= b1.y && a1.y >= b0.y
    }

    /// Strict overlap test: touching edges do not count.
    #[inline]
    pub fn overlaps_strict(self, other: Rect) -> bool {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        a0.x < b1.x && a1.x > b0.x && a0.y < b1.y && a1.y > b0.y
    }

    /// Inclusive containment: `[min, max]`.
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let (lo, hi) = (self.min(), self.max());
        p.x >= lo.x && p.y >= lo.y && p.x <= hi.x && p.y <= hi.y
    }

    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let x1 = self.max().x.min(other.max().x);
        let y1 = self.max().y.min(other.max().y);

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }
}
