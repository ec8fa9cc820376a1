/// What a lone finger does on the canvas.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SingleFingerMode {
    Draw,
    #[default]
    Pan,
    Ignore,
}

/// What two or more fingers do on the canvas.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DoubleFingerMode {
    #[default]
    ZoomPan,
    Ignore,
}

/// Effect of a stylus barrel button (or a long hold) while drawing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum StylusButtonAction {
    #[default]
    EraserHold,
    NoAction,
}

/// Shortcut fired by a quick multi-finger tap.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MultiFingerTapAction {
    None,
    Undo,
    Redo,
}

/// Gesture mapping supplied by the settings collaborator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputSettings {
    pub single_finger_mode: SingleFingerMode,
    pub double_finger_mode: DoubleFingerMode,
    pub stylus_primary_action: StylusButtonAction,
    pub stylus_secondary_action: StylusButtonAction,
    pub stylus_long_hold_action: StylusButtonAction,
    pub two_finger_tap_action: MultiFingerTapAction,
    pub three_finger_tap_action: MultiFingerTapAction,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            single_finger_mode: SingleFingerMode::Pan,
            double_finger_mode: DoubleFingerMode::ZoomPan,
            stylus_primary_action: StylusButtonAction::EraserHold,
            stylus_secondary_action: StylusButtonAction::EraserHold,
            stylus_long_hold_action: StylusButtonAction::NoAction,
            two_finger_tap_action: MultiFingerTapAction::Undo,
            three_finger_tap_action: MultiFingerTapAction::Redo,
        }
    }
}

impl InputSettings {
    pub fn with_single_finger_mode(mut self, mode: SingleFingerMode) -> Self {
        self.single_finger_mode = mode;
        self
    }

    pub fn with_double_finger_mode(mut self, mode: DoubleFingerMode) -> Self {
        self.double_finger_mode = mode;
        self
    }

    pub fn with_long_hold_action(mut self, action: StylusButtonAction) -> Self {
        self.stylus_long_hold_action = action;
        self
    }

    /// Action mapped to a tap with `fingers` contacts, if any.
    pub fn tap_action(&self, fingers: usize) -> MultiFingerTapAction {
        match fingers {
            2 => self.two_finger_tap_action,
            3 => self.three_finger_tap_action,
            _ => MultiFingerTapAction::None,
        }
    }
}
