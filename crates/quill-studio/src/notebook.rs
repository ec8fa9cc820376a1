use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use parking_lot::RwLock;
use quill_engine::coords::{PageSize, Vec2, ViewTransform, Viewport};
use quill_engine::core::{App, AppControl, FrameCtx};
use quill_engine::edit::InkHistory;
use quill_engine::ink::{InkPage, StrokeStyle, Tool};
use quill_engine::input::PointerEvent;
use quill_engine::paint::{Argb, Color};
use quill_engine::render::{
    render_queue, GpuMesh, RedrawMode, RenderCommand, RenderInbox, RenderQueue, StoreConfig, StrokeRenderer,
    StrokeStore,
};
use quill_engine::router::{resolve_motion_predictor, GestureRouter, InputSettings, RouterCtx};
use quill_engine::tile::TileCacheConfig;
use quill_engine::time::FrameStats;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::WindowId;

use crate::edits::PendingEdits;
use crate::tiles::TileWarmer;

/// A4 at 150 dpi.
const PAGE: PageSize = PageSize::new(1240.0, 1754.0);
const DESK: Color = Color::from_premul(0.18, 0.18, 0.2, 1.0);
const WHEEL_ZOOM_STEP: f32 = 1.1;
const WHEEL_LINE_PX: f32 = 40.0;

/// Single-page notebook canvas.
pub struct NotebookApp {
    page: Arc<RwLock<InkPage>>,
    history: InkHistory,
    transform: ViewTransform,
    brush: StrokeStyle,

    router: GestureRouter,
    edits: PendingEdits,
    queue: RenderQueue,
    inbox: RenderInbox,

    store: StrokeStore<GpuMesh>,
    renderer: StrokeRenderer,
    stats: FrameStats,
    tiles: Option<TileWarmer>,

    viewport: Viewport,
    scale_factor: f64,
    cursor: Vec2,
    modifiers: ModifiersState,
    title: String,
}

impl NotebookApp {
    pub fn new() -> Result<Self> {
        let page = Arc::new(RwLock::new(InkPage::new(PAGE)));
        let (queue, inbox) = render_queue();
        let router = GestureRouter::new(InputSettings::default(), resolve_motion_predictor(true), queue.clone());

        let tiles = match TileWarmer::new(Arc::clone(&page), TileCacheConfig::default()) {
            Ok(tiles) => Some(tiles),
            Err(e) => {
                log::warn!("tile cache disabled: {e:#}");
                None
            }
        };

        let transform = ViewTransform::new(1.0, 24.0, 24.0);
        queue.send(RenderCommand::SetCommittedStrokes {
            strokes: Vec::new(),
            page_size: PAGE,
        });
        queue.send(RenderCommand::SetViewTransform(transform));

        Ok(Self {
            page,
            history: InkHistory::default(),
            transform,
            brush: StrokeStyle::default(),
            router,
            edits: PendingEdits::default(),
            queue,
            inbox,
            store: StrokeStore::new(StoreConfig::default()),
            renderer: StrokeRenderer::new(),
            stats: FrameStats::new(),
            tiles,
            viewport: Viewport::default(),
            scale_factor: 1.0,
            cursor: Vec2::zero(),
            modifiers: ModifiersState::empty(),
            title: String::new(),
        })
    }

    /// Applies buffered router callbacks to the page and tells the renderer.
    fn flush_edits(&mut self) {
        self.edits.transformed = false;
        if self.edits.double_taps > 0 {
            log::debug!("double tap x{}", self.edits.double_taps);
            self.edits.double_taps = 0;
        }
        if self.edits.is_empty() {
            return;
        }

        let applied = {
            let mut page = self.page.write();
            self.edits.apply(&mut page, &mut self.history)
        };

        if applied.page_changed {
            let page = self.page.read();
            self.queue.send(RenderCommand::SetCommittedStrokes {
                strokes: page.strokes().to_vec(),
                page_size: page.size(),
            });
        }
        if !applied.render_finished.is_empty() {
            self.queue.send(RenderCommand::RemoveFinishedStrokes(applied.render_finished));
        }

        if let Some(tiles) = self.tiles.as_mut() {
            if applied.history_jumped {
                tiles.invalidate_all();
            } else {
                for (bounds, width) in applied.touched {
                    tiles.invalidate_stroke(bounds, width);
                }
            }
        }
    }

    fn status_title(&self) -> String {
        format!(
            "Quill Studio · {:?} · {:.0}% · {} strokes",
            self.brush.tool,
            self.transform.zoom * 100.0,
            self.store.committed_len()
        )
    }

    fn set_tool(&mut self, tool: Tool) {
        self.brush = match tool {
            Tool::Pen => StrokeStyle::default(),
            Tool::Highlighter => StrokeStyle::default()
                .with_tool(Tool::Highlighter)
                .with_color(Argb(0xFFFF_EB3B))
                .with_width(14.0),
            Tool::Eraser => StrokeStyle::default().with_tool(Tool::Eraser).with_width(12.0),
        };
        log::info!("tool: {tool:?}");
    }

    fn on_key(&mut self, code: KeyCode) {
        let ctrl = self.modifiers.control_key() || self.modifiers.super_key();
        match code {
            KeyCode::KeyZ if ctrl && self.modifiers.shift_key() => self.edits.request_redo(),
            KeyCode::KeyZ if ctrl => self.edits.request_undo(),
            KeyCode::KeyY if ctrl => self.edits.request_redo(),
            KeyCode::Digit1 => self.set_tool(Tool::Pen),
            KeyCode::Digit2 => self.set_tool(Tool::Highlighter),
            KeyCode::Digit3 => self.set_tool(Tool::Eraser),
            KeyCode::Escape => self.router.reset(&mut self.edits),
            _ => {}
        }
        self.flush_edits();
    }

    /// Ctrl+wheel zooms about the cursor; a plain wheel pans.
    fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let (dx, dy) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (x * WHEEL_LINE_PX, y * WHEEL_LINE_PX),
            MouseScrollDelta::PixelDelta(p) => {
                let logical = p.to_logical::<f64>(self.scale_factor);
                (logical.x as f32, logical.y as f32)
            }
        };

        if self.modifiers.control_key() {
            let zoom_change = if dy > 0.0 { WHEEL_ZOOM_STEP } else { 1.0 / WHEEL_ZOOM_STEP };
            self.transform.apply_gesture(zoom_change, Vec2::zero(), self.cursor);
        } else {
            self.transform.apply_gesture(1.0, Vec2::new(dx, dy), self.cursor);
        }
        self.queue.send(RenderCommand::SetViewTransform(self.transform));
    }
}

impl App for NotebookApp {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::ModifiersChanged(m) => self.modifiers = m.state(),
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.scale_factor);
                self.cursor = Vec2::new(logical.x as f32, logical.y as f32);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => self.scale_factor = *scale_factor,
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(*delta),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.on_key(code);
                }
            }
            WindowEvent::Focused(false) => {
                self.router.reset(&mut self.edits);
                self.flush_edits();
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn on_pointer_event(&mut self, _window_id: WindowId, event: &PointerEvent) -> AppControl {
        {
            let page = self.page.read();
            let mut ctx = RouterCtx::new(self.brush, &mut self.transform, &page);
            self.router.handle(event, &mut ctx, &mut self.edits);
        }
        self.flush_edits();
        AppControl::Continue
    }

    fn redraw_mode(&self, _window_id: WindowId) -> RedrawMode {
        self.router.redraw_mode()
    }

    fn needs_redraw(&self, _window_id: WindowId) -> bool {
        self.inbox.has_pending()
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let start = Instant::now();
        self.viewport = ctx.window.viewport();
        self.scale_factor = ctx.window.window.scale_factor();

        for cmd in self.inbox.drain() {
            self.store.apply(cmd);
        }
        if let Some(at) = self.store.take_transform_update() {
            self.stats.note_transform(at);
        }
        if let Some(tiles) = self.tiles.as_mut() {
            tiles.update_view(self.transform, self.viewport);
            tiles.poll();
        }

        let store = &mut self.store;
        let renderer = &mut self.renderer;
        let viewport = self.viewport;
        let control = ctx.render(DESK, |rctx, target| {
            let mut alloc = rctx.mesh_allocator();
            let plan = store.prepare_frame(&mut alloc, viewport);
            renderer.render(rctx, target, &plan);
        });

        let title = self.status_title();
        if title != self.title {
            ctx.runtime.set_title(title.as_str());
            self.title = title;
        }

        self.stats.record(start, Instant::now());
        control
    }
}
