//! Rendered-tile caching for pages drawn as bitmaps.
//!
//! Tiles are fixed-size squares of a page rasterized at a discrete
//! [`ScaleBucket`]. The [`TileCache`] is the one structure shared across
//! threads; [`TileWorker`] fills it in the background.

mod bucket;
mod cache;
mod cancel;
mod key;
mod raster;
mod worker;

pub use bucket::ScaleBucket;
pub use cache::{
    Recycler, TileBitmap, TileCache, TileCacheConfig, TileCacheError, DEFAULT_TILE_CACHE_BYTES, DEFAULT_TILE_SIZE,
    LOW_MEMORY_TILE_CACHE_BYTES,
};
pub use cancel::CancelToken;
pub use key::{
    expand_invalidation_bounds, page_to_tile, stroke_invalidation_range, tile_range_for_bounds, visible_tiles, SurfaceId,
    TileKey, TileRange,
};
pub use raster::TileRasterizer;
pub use worker::{TileReady, TileSource, TileWorker};
