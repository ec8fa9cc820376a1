use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::coords::{Rect, Vec2};

/// Cell edge length used by page-level hit testing.
pub const DEFAULT_CELL_SIZE: f32 = 200.0;

/// Integer cell coordinate.
pub type CellKey = (i32, i32);

/// Grid of cell → ids, plus the bounds each id was inserted with.
///
/// Invariant: an id is present in exactly the cells overlapping its current
/// bounds, and in none once removed. Empty cells are dropped.
#[derive(Debug, Clone)]
pub struct SpatialIndex<K> {
    cell_size: f32,
    cells: HashMap<CellKey, HashSet<K>>,
    bounds: HashMap<K, Rect>,
}

impl<K> SpatialIndex<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty index. Non-positive cell sizes fall back to the default.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.bounds.contains_key(id)
    }

    pub fn bounds_of(&self, id: &K) -> Option<Rect> {
        self.bounds.get(id).copied()
    }

    /// Inserts `id`, replacing any previous registration.
    pub fn insert(&mut self, id: K, bounds: Rect) {
        self.remove(&id);
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().insert(id);
            }
        }
        self.bounds.insert(id, bounds);
    }

    /// Removes `id`. Returns false if it was not indexed.
    pub fn remove(&mut self, id: &K) -> bool {
        let Some(bounds) = self.bounds.remove(id) else {
            return false;
        };
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(cell) = self.cells.get_mut(&(cx, cy)) {
                    cell.remove(id);
                    if cell.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds.clear();
    }

    /// Ids whose bounds overlap `area` (inclusive edges).
    pub fn query(&self, area: Rect) -> HashSet<K> {
        let mut out = HashSet::new();
        let (x0, y0, x1, y1) = self.cell_range(area);
        let span = (x1 as i64 - x0 as i64 + 1) * (y1 as i64 - y0 as i64 + 1);

        if span > self.cells.len() as i64 {
            // Wide queries (zoomed far out) visit occupied cells instead.
            for ((cx, cy), ids) in &self.cells {
                if (x0..=x1).contains(cx) && (y0..=y1).contains(cy) {
                    self.collect_overlapping(ids, area, &mut out);
                }
            }
        } else {
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    if let Some(ids) = self.cells.get(&(cx, cy)) {
                        self.collect_overlapping(ids, area, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Ids whose bounds come within `radius` of `p`.
    pub fn query_point(&self, p: Vec2, radius: f32) -> HashSet<K> {
        self.query(Rect::new(p.x, p.y, 0.0, 0.0).expand(radius.max(0.0)))
    }

    /// Ids whose bounds overlap the bounding box of `polygon`.
    pub fn query_polygon(&self, polygon: &[Vec2]) -> HashSet<K> {
        match Rect::from_points(polygon.iter().copied()) {
            Some(area) => self.query(area),
            None => HashSet::new(),
        }
    }

    /// Cells an id currently occupies; exposed for invariant checks.
    pub fn cells_of(&self, id: &K) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self
            .cells
            .iter()
            .filter(|(_, ids)| ids.contains(id))
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn collect_overlapping(&self, ids: &HashSet<K>, area: Rect, out: &mut HashSet<K>) {
        for id in ids {
            if out.contains(id) {
                continue;
            }
            if self.bounds.get(id).is_some_and(|b| b.overlaps(area)) {
                out.insert(*id);
            }
        }
    }

    fn cell_range(&self, r: Rect) -> (i32, i32, i32, i32) {
        let (min, max) = (r.min(), r.max());
        let cell = |v: f32| (v / self.cell_size).floor() as i32;
        (cell(min.x), cell(min.y), cell(max.x), cell(max.y))
    }
}

impl<K> Default for SpatialIndex<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
