use std::f32::consts::FRAC_PI_2;
use std::time::Instant;

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Force, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::window::Window;

use crate::input::{ContactPhase, PointerEvent, PointerId, PointerSample, PointerTracker, ToolHint};

/// Translates winit window events into engine [`PointerEvent`]s.
///
/// Timestamps are milliseconds since this translator was created.
#[derive(Debug)]
pub struct WinitPointerInput {
    tracker: PointerTracker,
    origin: Instant,
}

impl Default for WinitPointerInput {
    fn default() -> Self {
        Self {
            tracker: PointerTracker::new(),
            origin: Instant::now(),
        }
    }
}

impl WinitPointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Returns zero or more pointer events for `event`.
    pub fn translate(&mut self, window: &Window, event: &WindowEvent) -> Vec<PointerEvent> {
        let time = self.now_ms();
        match event {
            WindowEvent::Touch(touch) => {
                let (phase, sample) = touch_sample(window, touch);
                self.tracker.contact(phase, sample, time).into_iter().collect()
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical_f32(window, *position);
                self.tracker.mouse_moved(x, y, time)
            }
            WindowEvent::CursorLeft { .. } => self.tracker.mouse_left(time),
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.tracker.mouse_button(true, pressed, time),
                    MouseButton::Right => self.tracker.mouse_button(false, pressed, time),
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }
}

fn touch_sample(window: &Window, touch: &Touch) -> (ContactPhase, PointerSample) {
    let phase = match touch.phase {
        TouchPhase::Started => ContactPhase::Started,
        TouchPhase::Moved => ContactPhase::Moved,
        TouchPhase::Ended => ContactPhase::Ended,
        TouchPhase::Cancelled => ContactPhase::Cancelled,
    };
    let (x, y) = to_logical_f32(window, touch.location);

    // A calibrated force with an altitude angle only comes from pens.
    let altitude = match touch.force {
        Some(Force::Calibrated { altitude_angle: Some(a), .. }) => Some(a as f32),
        _ => None,
    };
    let tool = if altitude.is_some() { ToolHint::Stylus } else { ToolHint::Finger };

    let mut sample = PointerSample::new(PointerId(touch.id), x, y, tool);
    sample.pressure = touch.force.map(|f| f.normalized() as f32);
    sample.tilt = altitude.map(|a| (FRAC_PI_2 - a).max(0.0)).unwrap_or(0.0);
    (phase, sample)
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let scale = window.scale_factor();
    let logical = pos.to_logical::<f64>(scale);
    (logical.x as f32, logical.y as f32)
}
