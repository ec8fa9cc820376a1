use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::coords::Rect;

use super::{StrokePoint, StrokeStyle};

/// Unique stroke identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(pub Uuid);

impl StrokeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Monotonic creation-order counter shared by everything that mints strokes.
#[derive(Debug, Default)]
pub struct StrokeSequence(AtomicU64);

impl StrokeSequence {
    pub fn starting_at(next: u64) -> Self {
        Self(AtomicU64::new(next))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// A finished stroke. Immutable; edits replace it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub id: StrokeId,
    pub points: Arc<[StrokePoint]>,
    pub style: StrokeStyle,
    pub bounds: Rect,
    /// Milliseconds; the earliest point timestamp.
    pub created_at: u64,
    pub sequence: u64,
}

impl Stroke {
    /// Builds a stroke, computing bounds padded by `padding` on every side.
    ///
    /// Returns `None` for an empty point list; a stroke has at least one point.
    pub fn from_points(
        id: StrokeId,
        points: Vec<StrokePoint>,
        style: StrokeStyle,
        padding: f32,
        sequence: u64,
    ) -> Option<Self> {
        let bounds = Rect::from_points(points.iter().map(StrokePoint::pos))?.expand(padding / 2.0);
        let created_at = points.iter().map(|p| p.t).min()?;
        Some(Self {
            id,
            points: points.into(),
            style,
            bounds,
            created_at,
            sequence,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
