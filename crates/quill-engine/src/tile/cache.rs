use std::sync::Arc;

use hashlink::LinkedHashMap;
use log::debug;
use parking_lot::Mutex;

use crate::coords::Rect;

use super::{stroke_invalidation_range, CancelToken, ScaleBucket, SurfaceId, TileKey};

pub const DEFAULT_TILE_CACHE_BYTES: usize = 32 * 1024 * 1024;
pub const LOW_MEMORY_TILE_CACHE_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_TILE_SIZE: u32 = 512;
const LOW_MEMORY_CLASS_MB: u32 = 192;
/// Floor on an entry's accounted size so empty bitmaps still age out.
const MIN_ENTRY_BYTES: usize = 1;

/// Something the tile cache can hold and account for.
pub trait TileBitmap: Send + Sync + 'static {
    fn byte_size(&self) -> usize;
}

fn accounted_bytes<T: TileBitmap>(bitmap: &T) -> usize {
    bitmap.byte_size().max(MIN_ENTRY_BYTES)
}

impl TileBitmap for image::RgbaImage {
    fn byte_size(&self) -> usize {
        self.as_raw().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileCacheError {
    #[error("tile size must be at least 1 px")]
    InvalidTileSize,
    #[error("tile cache budget must be at least 1 byte")]
    InvalidBudget,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileCacheConfig {
    pub max_bytes: usize,
    pub tile_size: u32,
}

impl Default for TileCacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_TILE_CACHE_BYTES,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl TileCacheConfig {
    /// Smaller budget on low-memory devices.
    pub fn for_device(low_ram: bool, memory_class_mb: u32) -> Self {
        let max_bytes = if low_ram || memory_class_mb < LOW_MEMORY_CLASS_MB {
            LOW_MEMORY_TILE_CACHE_BYTES
        } else {
            DEFAULT_TILE_CACHE_BYTES
        };
        Self {
            max_bytes,
            ..Self::default()
        }
    }
}

/// Receives every bitmap the cache lets go of. Runs under the cache lock;
/// it must not call back into the cache.
pub type Recycler<T> = Box<dyn Fn(Arc<T>) + Send + Sync>;

struct Entries<T> {
    map: LinkedHashMap<TileKey, Arc<T>>,
    bytes: usize,
}

impl<T: TileBitmap> Entries<T> {
    /// Looks up `key` and marks it most recently used.
    fn touch(&mut self, key: &TileKey) -> Option<Arc<T>> {
        let value = self.map.remove(key)?;
        self.map.insert(*key, Arc::clone(&value));
        Some(value)
    }

    fn take(&mut self, key: &TileKey) -> Option<Arc<T>> {
        let value = self.map.remove(key)?;
        self.bytes -= accounted_bytes(&*value);
        Some(value)
    }
}

/// Byte-budgeted LRU of rendered tiles, shared between the UI and tile
/// workers.
///
/// Every mutation happens under one mutex. At most one bitmap is live per
/// key: a render that loses a race, or finishes after its request was
/// cancelled, is handed to the recycler instead of being stored.
pub struct TileCache<T: TileBitmap> {
    max_bytes: usize,
    tile_size: u32,
    entries: Mutex<Entries<T>>,
    recycler: Recycler<T>,
}

impl<T: TileBitmap> TileCache<T> {
    pub fn new(config: TileCacheConfig) -> Result<Self, TileCacheError> {
        Self::with_recycler(config, Box::new(drop))
    }

    pub fn with_recycler(config: TileCacheConfig, recycler: Recycler<T>) -> Result<Self, TileCacheError> {
        if config.tile_size == 0 {
            return Err(TileCacheError::InvalidTileSize);
        }
        if config.max_bytes == 0 {
            return Err(TileCacheError::InvalidBudget);
        }
        Ok(Self {
            max_bytes: config.max_bytes,
            tile_size: config.tile_size,
            entries: Mutex::new(Entries {
                map: LinkedHashMap::new(),
                bytes: 0,
            }),
            recycler,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.entries.lock().bytes
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.entries.lock().map.contains_key(key)
    }

    pub fn get(&self, key: &TileKey) -> Option<Arc<T>> {
        self.entries.lock().touch(key)
    }

    /// Stores `bitmap` unless `key` is already cached, in which case the
    /// cached bitmap wins and `bitmap` is recycled.
    pub fn put(&self, key: TileKey, bitmap: T) -> Arc<T> {
        let bitmap = Arc::new(bitmap);
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.touch(&key) {
            (self.recycler)(bitmap);
            return existing;
        }
        self.insert_locked(&mut entries, key, Arc::clone(&bitmap));
        bitmap
    }

    /// Returns the cached tile, rendering it on a miss.
    ///
    /// `render` runs without the lock held. `None` means the request was
    /// cancelled; a render that completes after cancellation is recycled.
    pub fn get_or_put<F>(&self, key: TileKey, cancel: &CancelToken, render: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get(&key) {
            return Some(hit);
        }
        if cancel.is_cancelled() {
            return None;
        }

        let rendered = Arc::new(render());

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.touch(&key) {
            debug!("tile {key} raced; discarding duplicate render");
            (self.recycler)(rendered);
            return Some(existing);
        }
        if cancel.is_cancelled() {
            (self.recycler)(rendered);
            return None;
        }
        self.insert_locked(&mut entries, key, Arc::clone(&rendered));
        Some(rendered)
    }

    /// Drops every tile of `surface`. Returns how many were removed.
    pub fn invalidate_surface(&self, surface: SurfaceId) -> usize {
        self.remove_where(|key| key.surface == surface)
    }

    /// Drops the tiles of `surface` that a stroke with `bounds` (page units)
    /// and `max_width` could touch, across every bucket.
    pub fn invalidate_stroke(&self, surface: SurfaceId, bounds: Rect, max_width: f32) -> usize {
        let ranges: Vec<(ScaleBucket, _)> = ScaleBucket::ALL
            .into_iter()
            .map(|b| (b, stroke_invalidation_range(bounds, max_width, self.tile_size, b)))
            .filter(|(_, range)| range.is_valid())
            .collect();
        if ranges.is_empty() {
            return 0;
        }
        self.remove_where(|key| {
            key.surface == surface
                && ranges
                    .iter()
                    .any(|(bucket, range)| *bucket == key.bucket && range.contains(key.tx, key.ty))
        })
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let n = entries.map.len();
        while let Some((_, bitmap)) = entries.map.pop_front() {
            (self.recycler)(bitmap);
        }
        entries.bytes = 0;
        debug!("tile cache cleared ({n} tiles)");
    }

    fn remove_where(&self, mut pred: impl FnMut(&TileKey) -> bool) -> usize {
        let mut entries = self.entries.lock();
        let doomed: Vec<TileKey> = entries.map.keys().filter(|k| pred(k)).copied().collect();
        for key in &doomed {
            if let Some(bitmap) = entries.take(key) {
                (self.recycler)(bitmap);
            }
        }
        doomed.len()
    }

    fn insert_locked(&self, entries: &mut Entries<T>, key: TileKey, bitmap: Arc<T>) {
        entries.bytes += accounted_bytes(&*bitmap);
        entries.map.insert(key, bitmap);

        let mut evicted = 0usize;
        while entries.bytes > self.max_bytes {
            let Some((_, old)) = entries.map.pop_front() else {
                break;
            };
            entries.bytes -= accounted_bytes(&*old);
            (self.recycler)(old);
            evicted += 1;
        }
        if evicted > 0 {
            debug!("tile cache evicted {evicted} tiles, {} bytes live", entries.bytes);
        }
    }
}
