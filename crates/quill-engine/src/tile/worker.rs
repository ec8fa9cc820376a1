use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use image::RgbaImage;
use log::{debug, error, trace};
use parking_lot::{Mutex, RwLock};

use crate::coords::Rect;
use crate::ink::{InkPage, Stroke};

use super::{CancelToken, SurfaceId, TileCache, TileKey, TileRasterizer};

/// Where a tile worker reads strokes from.
pub trait TileSource: Send + Sync + 'static {
    /// Strokes of `surface` overlapping `area`, in paint order.
    fn strokes_in(&self, surface: SurfaceId, area: Rect) -> Vec<Stroke>;
}

/// A single shared page; every surface id resolves to it.
impl TileSource for RwLock<InkPage> {
    fn strokes_in(&self, _surface: SurfaceId, area: Rect) -> Vec<Stroke> {
        self.read().query_rect(area).into_iter().cloned().collect()
    }
}

/// A finished tile, already stored in the cache.
#[derive(Debug, Clone)]
pub struct TileReady {
    pub key: TileKey,
    pub bitmap: Arc<RgbaImage>,
}

struct TileRequest {
    key: TileKey,
    cancel: CancelToken,
}

type Pending = Arc<Mutex<HashMap<TileKey, CancelToken>>>;

/// Background thread that renders requested tiles into a shared cache.
pub struct TileWorker {
    sender: Option<Sender<TileRequest>>,
    pending: Pending,
    handle: Option<JoinHandle<()>>,
}

impl TileWorker {
    pub fn spawn(cache: Arc<TileCache<RgbaImage>>, source: Arc<dyn TileSource>) -> Result<(Self, Receiver<TileReady>)> {
        let (sender, requests) = channel::unbounded::<TileRequest>();
        let (ready_tx, ready_rx) = channel::unbounded::<TileReady>();
        let pending: Pending = Arc::default();

        let thread_pending = Arc::clone(&pending);
        let handle = std::thread::Builder::new()
            .name("quill-tiles".into())
            .spawn(move || run(cache, source, requests, ready_tx, thread_pending))
            .context("failed to spawn tile worker thread")?;

        Ok((
            Self {
                sender: Some(sender),
                pending,
                handle: Some(handle),
            },
            ready_rx,
        ))
    }

    /// Queues `key` unless it is already pending. Returns the request's token.
    pub fn request(&self, key: TileKey) -> CancelToken {
        let mut pending = self.pending.lock();
        if let Some(token) = pending.get(&key) {
            return token.clone();
        }
        let cancel = CancelToken::new();
        let Some(sender) = self.sender.as_ref() else {
            cancel.cancel();
            return cancel;
        };
        if sender
            .send(TileRequest {
                key,
                cancel: cancel.clone(),
            })
            .is_err()
        {
            error!("tile worker is gone; request for {key} dropped");
            cancel.cancel();
            return cancel;
        }
        pending.insert(key, cancel.clone());
        cancel
    }

    /// Cancels every pending request whose key fails `keep`. Returns how
    /// many were cancelled.
    pub fn retain(&self, mut keep: impl FnMut(&TileKey) -> bool) -> usize {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|key, token| {
            let kept = keep(key);
            if !kept {
                token.cancel();
            }
            kept
        });
        let cancelled = before - pending.len();
        if cancelled > 0 {
            debug!("cancelled {cancelled} tile requests");
        }
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Stops accepting requests and waits for the thread to drain.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("tile worker thread panicked");
            }
        }
    }
}

impl Drop for TileWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    cache: Arc<TileCache<RgbaImage>>,
    source: Arc<dyn TileSource>,
    requests: Receiver<TileRequest>,
    ready: Sender<TileReady>,
    pending: Pending,
) {
    let mut rasterizer = TileRasterizer::new(cache.tile_size());
    for TileRequest { key, cancel } in requests.iter() {
        let bitmap = if cancel.is_cancelled() {
            trace!("tile {key} cancelled before render");
            None
        } else {
            let strokes = source.strokes_in(key.surface, key.page_rect(cache.tile_size()));
            cache.get_or_put(key, &cancel, || rasterizer.rasterize(&key, strokes.iter()))
        };

        {
            let mut pending = pending.lock();
            if pending.get(&key).is_some_and(|t| t.is_same(&cancel)) {
                pending.remove(&key);
            }
        }

        if let Some(bitmap) = bitmap {
            if ready.send(TileReady { key, bitmap }).is_err() {
                debug!("tile receiver dropped; worker exiting");
                break;
            }
        }
    }
}
