use crate::coords::Vec2;

/// One recorded sample in page units. Immutable once recorded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Event time in milliseconds.
    pub t: u64,
    /// Normalized pressure in `[0, 1]`, when the device reports one.
    pub pressure: Option<f32>,
    pub tilt_x: Option<f32>,
    pub tilt_y: Option<f32>,
    /// Orientation in radians.
    pub orientation: Option<f32>,
}

impl StrokePoint {
    /// A bare positional sample (no pressure or tilt).
    pub fn at(x: f32, y: f32, t: u64) -> Self {
        Self {
            x,
            y,
            t,
            pressure: None,
            tilt_x: None,
            tilt_y: None,
            orientation: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure.clamp(0.0, 1.0));
        self
    }

    /// Records tilt as a vector projected by `orientation`.
    pub fn with_tilt(mut self, tilt: f32, orientation: f32) -> Self {
        self.tilt_x = Some(tilt * orientation.cos());
        self.tilt_y = Some(tilt * orientation.sin());
        self.orientation = Some(orientation);
        self
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn same_position(&self, other: &StrokePoint) -> bool {
        self.x == other.x && self.y == other.y
    }
}
