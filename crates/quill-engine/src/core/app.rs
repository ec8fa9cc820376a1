use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::input::PointerEvent;
use crate::render::RedrawMode;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the studio (or any embedder).
///
/// All callbacks run synchronously on the event-loop thread.
pub trait App {
    /// Raw window events, after pointer translation.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// One translated pointer event. Must not block.
    fn on_pointer_event(&mut self, window_id: WindowId, event: &PointerEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// `Continuous` keeps frames coming every vsync.
    fn redraw_mode(&self, window_id: WindowId) -> RedrawMode {
        let _ = window_id;
        RedrawMode::OnDemand
    }

    /// One-off frame request, e.g. after queued render commands.
    fn needs_redraw(&self, window_id: WindowId) -> bool {
        let _ = window_id;
        false
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
