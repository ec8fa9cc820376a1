use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use image::RgbaImage;
use parking_lot::RwLock;
use quill_engine::coords::{Rect, ViewTransform, Viewport};
use quill_engine::ink::InkPage;
use quill_engine::tile::{
    visible_tiles, ScaleBucket, SurfaceId, TileCache, TileCacheConfig, TileRange, TileReady, TileWorker,
};

const PAGE_SURFACE: SurfaceId = SurfaceId(0);

/// Keeps the tile cache warm for the visible part of the page.
///
/// Tiles are rasterized off the event-loop thread; live ink always goes
/// through the stroke store.
pub struct TileWarmer {
    cache: Arc<TileCache<RgbaImage>>,
    worker: TileWorker,
    ready: Receiver<TileReady>,
    bucket: Option<ScaleBucket>,
    range: TileRange,
    ready_count: u64,
}

impl TileWarmer {
    pub fn new(page: Arc<RwLock<InkPage>>, config: TileCacheConfig) -> Result<Self> {
        let cache = Arc::new(TileCache::new(config)?);
        let (worker, ready) = TileWorker::spawn(Arc::clone(&cache), page)?;
        Ok(Self {
            cache,
            worker,
            ready,
            bucket: None,
            range: TileRange::EMPTY,
            ready_count: 0,
        })
    }

    /// Requests the tiles under `viewport` and cancels the ones that left it.
    pub fn update_view(&mut self, transform: ViewTransform, viewport: Viewport) {
        if !viewport.is_valid() {
            return;
        }
        let bucket = ScaleBucket::for_zoom(transform.zoom, self.bucket);
        if self.bucket != Some(bucket) {
            log::debug!("tile bucket -> {bucket}");
        }
        let range = visible_tiles(transform.visible_page_rect(viewport), self.cache.tile_size(), bucket);
        if self.bucket == Some(bucket) && self.range == range {
            return;
        }
        self.bucket = Some(bucket);
        self.range = range;

        self.worker.retain(|key| key.bucket == bucket && range.contains(key.tx, key.ty));
        for key in range.keys(PAGE_SURFACE, bucket) {
            if !self.cache.contains(&key) {
                self.worker.request(key);
            }
        }
    }

    /// Drops cached tiles under an edited stroke and re-requests the visible ones.
    pub fn invalidate_stroke(&mut self, bounds: Rect, max_width: f32) {
        let removed = self.cache.invalidate_stroke(PAGE_SURFACE, bounds, max_width);
        if removed > 0 {
            self.refresh();
        }
    }

    pub fn invalidate_all(&mut self) {
        if self.cache.invalidate_surface(PAGE_SURFACE) > 0 {
            self.refresh();
        }
    }

    /// Collects finished tiles. Returns how many arrived.
    pub fn poll(&mut self) -> usize {
        let arrived = self.ready.try_iter().count();
        if arrived > 0 {
            self.ready_count += arrived as u64;
            log::trace!(
                "{arrived} tiles ready ({} total, cache {} KiB)",
                self.ready_count,
                self.cache.size_bytes() / 1024
            );
        }
        arrived
    }

    fn refresh(&mut self) {
        let Some(bucket) = self.bucket else { return };
        for key in self.range.keys(PAGE_SURFACE, bucket) {
            if !self.cache.contains(&key) {
                self.worker.request(key);
            }
        }
    }
}
