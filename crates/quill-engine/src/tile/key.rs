use std::fmt;

use crate::coords::{Rect, Vec2};

use super::ScaleBucket;

/// Extra page units added around a stroke when invalidating tiles.
const INVALIDATION_BLEED: f32 = 2.0;

/// Keeps a max edge that lands exactly on a tile boundary out of the next tile.
const MAX_COORD_EPSILON: f32 = 1e-4;

/// Identifies one drawing surface (a page) in the tile cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub surface: SurfaceId,
    pub tx: i32,
    pub ty: i32,
    pub bucket: ScaleBucket,
}

impl TileKey {
    pub fn new(surface: SurfaceId, tx: i32, ty: i32, bucket: ScaleBucket) -> Self {
        Self { surface, tx, ty, bucket }
    }

    /// Page-space area covered by this tile: `tile_size / bucket` units square.
    pub fn page_rect(&self, tile_size: u32) -> Rect {
        let span = tile_size as f32 / self.bucket.factor();
        Rect::new(self.tx as f32 * span, self.ty as f32 * span, span, span)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {})/{}", self.surface, self.tx, self.ty, self.bucket)
    }
}

/// Inclusive range of tile indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl TileRange {
    pub const EMPTY: TileRange = TileRange {
        min_x: 0,
        max_x: -1,
        min_y: 0,
        max_y: -1,
    };

    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn contains(&self, tx: i32, ty: i32) -> bool {
        (self.min_x..=self.max_x).contains(&tx) && (self.min_y..=self.max_y).contains(&ty)
    }

    /// Keys for every tile in the range.
    pub fn keys(self, surface: SurfaceId, bucket: ScaleBucket) -> impl Iterator<Item = TileKey> {
        (self.min_y..=self.max_y)
            .flat_map(move |ty| (self.min_x..=self.max_x).map(move |tx| TileKey::new(surface, tx, ty, bucket)))
    }
}

/// Tiles at `bucket` that `bounds` (page units) touches. Empty bounds give
/// an invalid range.
pub fn tile_range_for_bounds(bounds: Rect, tile_size: u32, bucket: ScaleBucket) -> TileRange {
    if bounds.is_empty() || tile_size == 0 {
        return TileRange::EMPTY;
    }
    let ts = tile_size as f32;
    let b = bucket.factor();
    let min = bounds.min();
    let max = bounds.max();
    TileRange {
        min_x: (min.x * b / ts).floor() as i32,
        max_x: ((max.x * b - MAX_COORD_EPSILON) / ts).floor() as i32,
        min_y: (min.y * b / ts).floor() as i32,
        max_y: ((max.y * b - MAX_COORD_EPSILON) / ts).floor() as i32,
    }
}

/// Grows stroke bounds by half the widest rendered width plus a bleed margin.
pub fn expand_invalidation_bounds(bounds: Rect, max_width: f32) -> Rect {
    if bounds.is_empty() {
        return bounds;
    }
    bounds.expand(max_width.max(0.0) / 2.0 + INVALIDATION_BLEED)
}

/// Tiles to drop at `bucket` after a stroke with `bounds` changed.
pub fn stroke_invalidation_range(bounds: Rect, max_width: f32, tile_size: u32, bucket: ScaleBucket) -> TileRange {
    tile_range_for_bounds(expand_invalidation_bounds(bounds, max_width), tile_size, bucket)
}

/// Tiles at `bucket` needed to cover the page area `visible`.
pub fn visible_tiles(visible: Rect, tile_size: u32, bucket: ScaleBucket) -> TileRange {
    tile_range_for_bounds(visible, tile_size, bucket)
}

/// Page-to-tile-pixel mapping for rasterizing `key`.
pub fn page_to_tile(key: &TileKey, tile_size: u32, p: Vec2) -> Vec2 {
    (p - key.page_rect(tile_size).min()) * key.bucket.factor()
}
