use std::fmt;

use crate::coords::Vec2;

/// Stable identifier of one contact for the duration of its gesture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The mouse, which the runtime treats as a stylus.
    pub const MOUSE: PointerId = PointerId(u64::MAX);
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MOUSE {
            f.write_str("mouse")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// What the pointer event reports about its batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    Cancel,
    HoverEnter,
    HoverMove,
    HoverExit,
}

impl PointerAction {
    pub fn is_hover(self) -> bool {
        matches!(self, Self::HoverEnter | Self::HoverMove | Self::HoverExit)
    }
}

/// Tool type as reported by the platform. Only a hint: the classifier
/// decides what the pointer really is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ToolHint {
    Stylus,
    Eraser,
    Finger,
    #[default]
    Unknown,
}

/// Input device class of the whole event stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SourceHint {
    Stylus,
    Touchscreen,
    Mouse,
    #[default]
    Unknown,
}

/// Barrel buttons held during the event.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct StylusButtons {
    pub primary: bool,
    pub secondary: bool,
}

impl StylusButtons {
    pub fn any(self) -> bool {
        self.primary || self.secondary
    }
}

/// A batched sample older than the pointer's current position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HistoricalSample {
    pub x: f32,
    pub y: f32,
    pub time_ms: u64,
    pub pressure: Option<f32>,
    pub tilt: f32,
    pub orientation: f32,
}

/// Current state of one pointer, in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
    pub tool: ToolHint,
    /// Normalized to `[0, 1]` when the device reports it.
    pub pressure: Option<f32>,
    /// Radians from perpendicular.
    pub tilt: f32,
    /// Radians.
    pub orientation: f32,
    /// Hover distance; zero while in contact.
    pub distance: f32,
    /// Normalized contact size.
    pub size: f32,
    pub history: Vec<HistoricalSample>,
}

impl PointerSample {
    pub fn new(id: PointerId, x: f32, y: f32, tool: ToolHint) -> Self {
        Self {
            id,
            x,
            y,
            tool,
            pressure: None,
            tilt: 0.0,
            orientation: 0.0,
            distance: 0.0,
            size: 0.0,
            history: Vec::new(),
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// One batch of pointer state, as the platform delivers it.
///
/// `Down` and `Up` carry every pointer currently in contact, with
/// `action_index` naming the one that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub action_index: usize,
    pub pointers: Vec<PointerSample>,
    pub buttons: StylusButtons,
    pub source: SourceHint,
    pub time_ms: u64,
    /// Set when the platform retracts the gesture (palm rejection).
    pub canceled: bool,
}

impl PointerEvent {
    pub fn new(action: PointerAction, pointers: Vec<PointerSample>, time_ms: u64) -> Self {
        Self {
            action,
            action_index: 0,
            pointers,
            buttons: StylusButtons::default(),
            source: SourceHint::Unknown,
            time_ms,
            canceled: false,
        }
    }

    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn with_buttons(mut self, buttons: StylusButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_source(mut self, source: SourceHint) -> Self {
        self.source = source;
        self
    }

    pub fn canceled(mut self) -> Self {
        self.canceled = true;
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// The pointer that went down or up.
    pub fn action_pointer(&self) -> Option<&PointerSample> {
        self.pointers.get(self.action_index)
    }

    pub fn pointer(&self, id: PointerId) -> Option<&PointerSample> {
        self.pointers.iter().find(|p| p.id == id)
    }
}
