use std::collections::HashSet;

use crate::coords::{PageSize, Rect, Vec2};
use crate::spatial::{SpatialIndex, DEFAULT_CELL_SIZE};

use super::{Stroke, StrokeId};

/// Ordered strokes of one page plus a spatial index over their bounds.
///
/// Order is z-order: later strokes paint over earlier ones.
#[derive(Debug, Clone)]
pub struct InkPage {
    size: PageSize,
    strokes: Vec<Stroke>,
    index: SpatialIndex<StrokeId>,
}

impl InkPage {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            strokes: Vec::new(),
            index: SpatialIndex::new(DEFAULT_CELL_SIZE),
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn index(&self) -> &SpatialIndex<StrokeId> {
        &self.index
    }

    pub fn position(&self, id: StrokeId) -> Option<usize> {
        self.strokes.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    /// Appends a stroke on top. A stroke with the same id is replaced in place.
    pub fn add(&mut self, stroke: Stroke) {
        self.index.insert(stroke.id, stroke.bounds);
        match self.position(stroke.id) {
            Some(i) => self.strokes[i] = stroke,
            None => self.strokes.push(stroke),
        }
    }

    pub fn insert(&mut self, index: usize, stroke: Stroke) {
        self.index.insert(stroke.id, stroke.bounds);
        let at = index.min(self.strokes.len());
        self.strokes.insert(at, stroke);
    }

    pub fn remove(&mut self, id: StrokeId) -> Option<Stroke> {
        let i = self.position(id)?;
        self.index.remove(&id);
        Some(self.strokes.remove(i))
    }

    /// Replaces the whole stroke list and rebuilds the index.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.index.clear();
        for s in &strokes {
            self.index.insert(s.id, s.bounds);
        }
        self.strokes = strokes;
    }

    /// Strokes whose bounds lie within `radius` of `p`, in z-order.
    pub fn query_point(&self, p: Vec2, radius: f32) -> Vec<&Stroke> {
        self.in_order(self.index.query_point(p, radius))
    }

    /// Strokes whose bounds overlap `area`, in z-order.
    pub fn query_rect(&self, area: Rect) -> Vec<&Stroke> {
        self.in_order(self.index.query(area))
    }

    /// Strokes whose bounds overlap the polygon's bounding box, in z-order.
    pub fn query_polygon(&self, polygon: &[Vec2]) -> Vec<&Stroke> {
        self.in_order(self.index.query_polygon(polygon))
    }

    fn in_order(&self, ids: HashSet<StrokeId>) -> Vec<&Stroke> {
        if ids.is_empty() {
            return Vec::new();
        }
        self.strokes.iter().filter(|s| ids.contains(&s.id)).collect()
    }
}
