use std::collections::HashSet;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use hashlink::LinkedHashMap;
use log::{debug, warn};

use crate::coords::{PageSize, Vec2, ViewTransform, Viewport};
use crate::geometry::{stroke_fingerprint, StrokeGeometry, StrokeGeometryBuilder};
use crate::ink::{Stroke, StrokeId, StrokePoint, StrokeStyle};
use crate::paint::{Argb, Color};
use crate::spatial::SpatialIndex;

use super::command::RenderCommand;
use super::mesh::{MeshAllocator, MeshBuffer, MeshRecord, MeshUsage};
use super::overlay::OverlayState;

const SELECTION_COLOR: Argb = Argb(0xFF1E_88E5);
const SELECTION_ALPHA: f32 = 0.22;
const LASSO_COLOR: Argb = Argb(0xFF42_A5F5);
const LASSO_ALPHA: f32 = 0.9;
const LASSO_WIDTH_PX: f32 = 2.2;
const HOVER_RING_WIDTH_PX: f32 = 1.6;
const HOVER_RING_SEGMENTS: u32 = 28;
const ZOOM_GUARD: f32 = 0.001;

/// Clip rect used when the page has no bounds.
const UNBOUNDED_CLIP: [f32; 4] = [-1.0e9, -1.0e9, 1.0e9, 1.0e9];

/// Tunables for the stroke store.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StoreConfig {
    /// Spatial index cell edge, page units.
    pub cell_size: f32,
    /// Extra screen pixels kept around the viewport when culling.
    pub cull_margin_px: f32,
    /// Upper bound on committed mesh bytes.
    pub committed_budget_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cell_size: 256.0,
            cull_margin_px: 96.0,
            committed_budget_bytes: 48 * 1024 * 1024,
        }
    }
}

/// Per-frame uniform (48 bytes):
///
///  offset  0  pan       [f32; 2]
///  offset  8  viewport  [f32; 2]  logical px
///  offset 16  clip      [f32; 4]  page rect in screen px (l, t, r, b)
///  offset 32  zoom      f32
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub pan: [f32; 2],
    pub viewport: [f32; 2],
    pub clip: [f32; 4],
    pub zoom: f32,
    pub _pad: [f32; 3],
}

/// Which pass of the frame a batch belongs to, in draw order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum DrawLayer {
    Committed,
    Active,
    Finished,
    Selection,
    Overlay,
}

/// Meshes sharing one premultiplied color.
#[derive(Debug)]
pub struct DrawBatch<'a, B> {
    pub layer: DrawLayer,
    pub color: Color,
    pub meshes: Vec<(&'a B, u32)>,
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug)]
pub struct FramePlan<'a, B> {
    pub uniform: FrameUniform,
    pub batches: Vec<DrawBatch<'a, B>>,
    /// Committed strokes that survived culling.
    pub visible_committed: usize,
}

impl<B> FramePlan<'_, B> {
    pub fn draw_count(&self) -> usize {
        self.batches.iter().map(|b| b.meshes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

struct CommittedStrokeRecord<B: MeshBuffer> {
    stroke: Stroke,
    color: Argb,
    alpha: f32,
    fingerprint: u64,
    mesh: Option<MeshRecord<B>>,
}

struct ActiveStrokeState<B: MeshBuffer> {
    style: StrokeStyle,
    alpha: f32,
    points: Vec<StrokePoint>,
    mesh: Option<MeshRecord<B>>,
    dirty: bool,
}

impl<B: MeshBuffer> ActiveStrokeState<B> {
    fn append(&mut self, point: StrokePoint) {
        let duplicate = self
            .points
            .last()
            .is_some_and(|last| last.same_position(&point) && last.pressure == point.pressure);
        if !duplicate {
            self.points.push(point);
            self.dirty = true;
        }
    }
}

/// Render-side model of the page: meshes for committed, in-progress and
/// just-finished strokes, plus overlay decorations.
///
/// Mutated only through [`apply`](Self::apply) and
/// [`prepare_frame`](Self::prepare_frame), both on the thread that owns the
/// device. `apply` never touches the allocator; uploads happen while preparing.
pub struct StrokeStore<B: MeshBuffer> {
    config: StoreConfig,
    builder: StrokeGeometryBuilder,
    transform: ViewTransform,
    transform_updated_at: Option<Instant>,
    page_size: PageSize,
    committed: LinkedHashMap<StrokeId, CommittedStrokeRecord<B>>,
    index: SpatialIndex<StrokeId>,
    active: LinkedHashMap<StrokeId, ActiveStrokeState<B>>,
    finished: LinkedHashMap<StrokeId, ActiveStrokeState<B>>,
    overlay: OverlayState,
    lasso_mesh: Option<MeshRecord<B>>,
    hover_mesh: Option<MeshRecord<B>>,
}

impl<B: MeshBuffer> StrokeStore<B> {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            builder: StrokeGeometryBuilder::new(),
            transform: ViewTransform::IDENTITY,
            transform_updated_at: None,
            page_size: PageSize::default(),
            committed: LinkedHashMap::new(),
            index: SpatialIndex::new(config.cell_size),
            active: LinkedHashMap::new(),
            finished: LinkedHashMap::new(),
            overlay: OverlayState::default(),
            lasso_mesh: None,
            hover_mesh: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn finished_len(&self) -> usize {
        self.finished.len()
    }

    pub fn is_committed(&self, id: StrokeId) -> bool {
        self.committed.contains_key(&id)
    }

    pub fn is_finished(&self, id: StrokeId) -> bool {
        self.finished.contains_key(&id)
    }

    /// Bytes held by uploaded committed meshes.
    pub fn committed_bytes(&self) -> u64 {
        self.committed
            .values()
            .filter_map(|r| r.mesh.as_ref())
            .map(MeshRecord::byte_size)
            .sum()
    }

    /// Active or finished strokes still need frames.
    pub fn has_live_strokes(&self) -> bool {
        !self.active.is_empty() || !self.finished.is_empty()
    }

    /// When the view transform last changed, consumed once per frame.
    pub fn take_transform_update(&mut self) -> Option<Instant> {
        self.transform_updated_at.take()
    }

    pub fn apply(&mut self, cmd: RenderCommand) {
        match cmd {
            RenderCommand::SetCommittedStrokes { strokes, page_size } => {
                self.set_committed_strokes(strokes, page_size);
            }
            RenderCommand::SetViewTransform(transform) => {
                self.transform = transform;
                self.transform_updated_at = Some(Instant::now());
            }
            RenderCommand::StartStroke { id, point, style, alpha } => {
                if self.active.contains_key(&id) {
                    warn!("stroke {id} started twice; restarting");
                }
                self.active.insert(
                    id,
                    ActiveStrokeState {
                        style,
                        alpha: style.render_alpha() * alpha,
                        points: vec![point],
                        mesh: None,
                        dirty: true,
                    },
                );
            }
            RenderCommand::AppendToStroke { id, point } => match self.active.get_mut(&id) {
                Some(state) => state.append(point),
                None => warn!("append to unknown stroke {id}"),
            },
            RenderCommand::FinishStroke { id } => match self.active.remove(&id) {
                Some(state) => {
                    self.finished.insert(id, state);
                }
                None => warn!("finish of unknown stroke {id}"),
            },
            RenderCommand::CancelStroke { id } => {
                self.active.remove(&id);
                self.finished.remove(&id);
            }
            RenderCommand::RemoveFinishedStrokes(ids) => {
                for id in ids {
                    self.finished.remove(&id);
                }
            }
            RenderCommand::SetOverlay(overlay) => {
                self.overlay = overlay;
            }
        }
    }

    /// Reconciles the committed set with `strokes`: unknown ids are added,
    /// missing ones dropped, changed ones marked for a rebuild.
    fn set_committed_strokes(&mut self, strokes: Vec<Stroke>, page_size: PageSize) {
        self.page_size = page_size;

        let incoming: HashSet<StrokeId> = strokes.iter().map(|s| s.id).collect();
        let stale: Vec<StrokeId> = self
            .committed
            .keys()
            .filter(|id| !incoming.contains(id))
            .copied()
            .collect();
        for id in &stale {
            self.committed.remove(id);
        }

        for stroke in strokes {
            let fingerprint = stroke_fingerprint(&stroke.points, &stroke.style);
            let color = stroke.style.color;
            let alpha = stroke.style.render_alpha();
            match self.committed.get_mut(&stroke.id) {
                Some(record) => {
                    if record.fingerprint != fingerprint {
                        record.mesh = None;
                        record.fingerprint = fingerprint;
                    }
                    record.color = color;
                    record.alpha = alpha;
                    record.stroke = stroke;
                }
                None => {
                    self.committed.insert(
                        stroke.id,
                        CommittedStrokeRecord {
                            stroke,
                            color,
                            alpha,
                            fingerprint,
                            mesh: None,
                        },
                    );
                }
            }
        }

        self.rebuild_index();
        debug!(
            "committed set: {} strokes ({} dropped)",
            self.committed.len(),
            stale.len()
        );
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (id, record) in self.committed.iter() {
            self.index.insert(*id, record.stroke.bounds);
        }
    }

    /// Uploads pending meshes, enforces the budget, culls, and batches.
    pub fn prepare_frame<A>(&mut self, alloc: &mut A, viewport: Viewport) -> FramePlan<'_, B>
    where
        A: MeshAllocator<Buffer = B>,
    {
        self.upload_committed(alloc);
        self.evict_over_budget();
        self.upload_live(alloc);
        self.upload_overlay(alloc);
        self.plan(viewport)
    }

    fn upload_committed<A: MeshAllocator<Buffer = B>>(&mut self, alloc: &mut A) {
        for record in self.committed.values_mut() {
            if record.mesh.is_some() {
                continue;
            }
            let geometry = self.builder.build(&record.stroke.points, &record.stroke.style);
            record.mesh = geometry.map(|g| MeshRecord::upload(alloc, &g, MeshUsage::Static));
        }
    }

    /// Drops the oldest committed strokes until their meshes fit the budget.
    fn evict_over_budget(&mut self) {
        let budget = self.config.committed_budget_bytes;
        let mut total = self.committed_bytes();
        if total <= budget {
            return;
        }
        let mut evicted = 0usize;
        while total > budget {
            let Some((_, record)) = self.committed.pop_front() else {
                break;
            };
            total -= record.mesh.as_ref().map_or(0, MeshRecord::byte_size);
            evicted += 1;
        }
        self.rebuild_index();
        debug!("mesh budget: evicted {evicted} committed strokes, {total} bytes remain");
    }

    fn upload_live<A: MeshAllocator<Buffer = B>>(&mut self, alloc: &mut A) {
        for state in self.active.values_mut().chain(self.finished.values_mut()) {
            if !state.dirty && state.mesh.is_some() {
                continue;
            }
            state.dirty = false;
            let Some(geometry) = self.builder.build(&state.points, &state.style) else {
                state.mesh = None;
                continue;
            };
            match state.mesh.as_mut() {
                Some(mesh) => mesh.update(alloc, &geometry, MeshUsage::Dynamic),
                None => state.mesh = Some(MeshRecord::upload(alloc, &geometry, MeshUsage::Dynamic)),
            }
        }
    }

    fn upload_overlay<A: MeshAllocator<Buffer = B>>(&mut self, alloc: &mut A) {
        let zoom = self.transform.zoom.max(ZOOM_GUARD);

        let lasso = if self.overlay.lasso.len() >= 2 {
            let mut path = self.overlay.lasso.clone();
            path.push(self.overlay.lasso[0]);
            self.builder.polyline(&path, LASSO_WIDTH_PX / zoom)
        } else {
            None
        };
        sync_overlay_mesh(&mut self.lasso_mesh, alloc, lasso);

        let hover = self.overlay.hover.filter(|h| h.radius > 0.0).and_then(|h| {
            let center = self.transform.screen_to_page(h.center);
            let radius = (h.radius / zoom).max(0.1);
            self.builder
                .ring(center, radius, HOVER_RING_WIDTH_PX / zoom, HOVER_RING_SEGMENTS)
        });
        sync_overlay_mesh(&mut self.hover_mesh, alloc, hover);
    }

    /// Committed ids worth drawing this frame, in insertion order.
    fn visible_committed(&self, viewport: Viewport) -> Vec<StrokeId> {
        if !viewport.is_valid() {
            return self.committed.keys().copied().collect();
        }
        let margin = self
            .transform
            .screen_len_to_page(self.config.cull_margin_px, ZOOM_GUARD);
        let area = self.transform.visible_page_rect(viewport).expand(margin);
        let hits = self.index.query(area);
        self.committed
            .keys()
            .filter(|id| hits.contains(id))
            .copied()
            .collect()
    }

    fn plan(&self, viewport: Viewport) -> FramePlan<'_, B> {
        let visible = self.visible_committed(viewport);
        let mut batches: Vec<DrawBatch<'_, B>> = Vec::new();

        // Committed strokes, grouped by (color, alpha) in first-seen order.
        let mut keyed: LinkedHashMap<(u32, u32), Vec<(&B, u32)>> = LinkedHashMap::new();
        for id in &visible {
            let Some(record) = self.committed.get(id) else {
                continue;
            };
            let Some(drawable) = record.mesh.as_ref().and_then(MeshRecord::drawable) else {
                continue;
            };
            // `entry` would move a hit key to the back and reorder batches.
            let key = (record.color.0, record.alpha.to_bits());
            match keyed.get_mut(&key) {
                Some(meshes) => meshes.push(drawable),
                None => {
                    keyed.insert(key, vec![drawable]);
                }
            }
        }
        for ((color, alpha), meshes) in keyed {
            batches.push(DrawBatch {
                layer: DrawLayer::Committed,
                color: Color::from_argb(Argb(color), f32::from_bits(alpha)),
                meshes,
            });
        }

        for (layer, strokes) in [(DrawLayer::Active, &self.active), (DrawLayer::Finished, &self.finished)] {
            for state in strokes.values() {
                if let Some(drawable) = state.mesh.as_ref().and_then(MeshRecord::drawable) {
                    batches.push(DrawBatch {
                        layer,
                        color: Color::from_argb(state.style.color, state.alpha),
                        meshes: vec![drawable],
                    });
                }
            }
        }

        if !self.overlay.selected.is_empty() {
            let meshes: Vec<(&B, u32)> = visible
                .iter()
                .filter(|id| self.overlay.selected.contains(id))
                .filter_map(|id| self.committed.get(id))
                .filter_map(|r| r.mesh.as_ref().and_then(MeshRecord::drawable))
                .collect();
            if !meshes.is_empty() {
                batches.push(DrawBatch {
                    layer: DrawLayer::Selection,
                    color: Color::from_argb(SELECTION_COLOR, SELECTION_ALPHA),
                    meshes,
                });
            }
        }

        if let Some(drawable) = self.lasso_mesh.as_ref().and_then(MeshRecord::drawable) {
            batches.push(DrawBatch {
                layer: DrawLayer::Overlay,
                color: Color::from_argb(LASSO_COLOR, LASSO_ALPHA),
                meshes: vec![drawable],
            });
        }
        if let (Some(hover), Some(drawable)) = (
            self.overlay.hover,
            self.hover_mesh.as_ref().and_then(MeshRecord::drawable),
        ) {
            batches.push(DrawBatch {
                layer: DrawLayer::Overlay,
                color: Color::from_argb(hover.color, hover.alpha),
                meshes: vec![drawable],
            });
        }

        FramePlan {
            uniform: self.frame_uniform(viewport),
            batches,
            visible_committed: visible.len(),
        }
    }

    fn frame_uniform(&self, viewport: Viewport) -> FrameUniform {
        let t = self.transform;
        let clip = if self.page_size.is_bounded() {
            let min = t.page_to_screen(Vec2::zero());
            let max = t.page_to_screen(Vec2::new(self.page_size.width, self.page_size.height));
            [min.x, min.y, max.x, max.y]
        } else {
            UNBOUNDED_CLIP
        };
        FrameUniform {
            pan: [t.pan_x, t.pan_y],
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            clip,
            zoom: t.zoom,
            _pad: [0.0; 3],
        }
    }
}

fn sync_overlay_mesh<A, B>(slot: &mut Option<MeshRecord<B>>, alloc: &mut A, geometry: Option<StrokeGeometry>)
where
    A: MeshAllocator<Buffer = B>,
    B: MeshBuffer,
{
    let Some(geometry) = geometry else {
        *slot = None;
        return;
    };
    if let Some(mesh) = slot.as_mut() {
        if mesh.fingerprint() != geometry.fingerprint {
            mesh.update(alloc, &geometry, MeshUsage::Dynamic);
        }
        return;
    }
    *slot = Some(MeshRecord::upload(alloc, &geometry, MeshUsage::Dynamic));
}
