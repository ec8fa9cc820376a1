use log::trace;

use super::types::{
    PointerAction, PointerEvent, PointerId, PointerSample, SourceHint, StylusButtons, ToolHint,
};

/// Hover distance reported for a mouse with no button held.
const MOUSE_HOVER_DISTANCE: f32 = 1.0;

/// Lifecycle of a single platform contact.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContactPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

#[derive(Debug, Default)]
struct MouseState {
    pos: Option<(f32, f32)>,
    left: bool,
    right: bool,
    hovering: bool,
}

/// Turns per-contact platform callbacks into batched [`PointerEvent`]s.
///
/// Keeps every pointer currently in contact so each `Down`/`Up` carries
/// the whole set, and emulates a hovering stylus with the mouse.
#[derive(Debug, Default)]
pub struct PointerTracker {
    contacts: Vec<PointerSample>,
    mouse: MouseState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointers currently in contact, in the order they went down.
    pub fn contacts(&self) -> &[PointerSample] {
        &self.contacts
    }

    fn buttons(&self) -> StylusButtons {
        StylusButtons {
            primary: self.mouse.left && self.mouse.right,
            secondary: false,
        }
    }

    fn source(&self) -> SourceHint {
        match self.contacts.first() {
            Some(p) if p.id == PointerId::MOUSE => SourceHint::Mouse,
            Some(p) if matches!(p.tool, ToolHint::Stylus | ToolHint::Eraser) => SourceHint::Stylus,
            Some(_) => SourceHint::Touchscreen,
            None => SourceHint::Unknown,
        }
    }

    fn event(&self, action: PointerAction, index: usize, time_ms: u64) -> PointerEvent {
        PointerEvent::new(action, self.contacts.clone(), time_ms)
            .with_action_index(index)
            .with_buttons(self.buttons())
            .with_source(self.source())
    }

    /// A touch or pen contact changed.
    pub fn contact(&mut self, phase: ContactPhase, sample: PointerSample, time_ms: u64) -> Option<PointerEvent> {
        let existing = self.contacts.iter().position(|p| p.id == sample.id);
        trace!("pointer {} {:?} at ({}, {})", sample.id, phase, sample.x, sample.y);

        match (phase, existing) {
            (ContactPhase::Started, None) => {
                self.contacts.push(sample);
                Some(self.event(PointerAction::Down, self.contacts.len() - 1, time_ms))
            }
            (ContactPhase::Started, Some(i)) | (ContactPhase::Moved, Some(i)) => {
                self.contacts[i] = sample;
                Some(self.event(PointerAction::Move, i, time_ms))
            }
            (ContactPhase::Ended, Some(i)) => {
                self.contacts[i] = sample;
                let ev = self.event(PointerAction::Up, i, time_ms);
                self.contacts.remove(i);
                Some(ev)
            }
            (ContactPhase::Cancelled, Some(i)) => {
                let ev = self.event(PointerAction::Cancel, i, time_ms).canceled();
                self.contacts.clear();
                self.mouse.left = false;
                Some(ev)
            }
            // Move/end for a contact we never saw go down.
            (_, None) => None,
        }
    }

    /// Mouse moved to `(x, y)`. Hovers when no button is held.
    pub fn mouse_moved(&mut self, x: f32, y: f32, time_ms: u64) -> Vec<PointerEvent> {
        self.mouse.pos = Some((x, y));
        if self.mouse.left {
            return self
                .contact(ContactPhase::Moved, self.mouse_sample(x, y, 0.0), time_ms)
                .into_iter()
                .collect();
        }
        let action = if self.mouse.hovering {
            PointerAction::HoverMove
        } else {
            self.mouse.hovering = true;
            PointerAction::HoverEnter
        };
        vec![self.hover_event(action, x, y, time_ms)]
    }

    /// Left is contact, right is the barrel button.
    pub fn mouse_button(&mut self, left: bool, pressed: bool, time_ms: u64) -> Vec<PointerEvent> {
        let Some((x, y)) = self.mouse.pos else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if !left {
            self.mouse.right = pressed;
            if self.mouse.left {
                out.extend(self.contact(ContactPhase::Moved, self.mouse_sample(x, y, 0.0), time_ms));
            } else if self.mouse.hovering {
                out.push(self.hover_event(PointerAction::HoverMove, x, y, time_ms));
            }
            return out;
        }

        match (pressed, self.mouse.left) {
            (true, false) => {
                if self.mouse.hovering {
                    self.mouse.hovering = false;
                    out.push(self.hover_event(PointerAction::HoverExit, x, y, time_ms));
                }
                self.mouse.left = true;
                out.extend(self.contact(ContactPhase::Started, self.mouse_sample(x, y, 0.0), time_ms));
            }
            (false, true) => {
                out.extend(self.contact(ContactPhase::Ended, self.mouse_sample(x, y, 0.0), time_ms));
                self.mouse.left = false;
            }
            _ => {}
        }
        out
    }

    /// Mouse left the window.
    pub fn mouse_left(&mut self, time_ms: u64) -> Vec<PointerEvent> {
        let Some((x, y)) = self.mouse.pos.take() else {
            return Vec::new();
        };
        if self.mouse.hovering {
            self.mouse.hovering = false;
            return vec![self.hover_event(PointerAction::HoverExit, x, y, time_ms)];
        }
        Vec::new()
    }

    fn mouse_sample(&self, x: f32, y: f32, distance: f32) -> PointerSample {
        PointerSample::new(PointerId::MOUSE, x, y, ToolHint::Stylus).with_distance(distance)
    }

    fn hover_event(&self, action: PointerAction, x: f32, y: f32, time_ms: u64) -> PointerEvent {
        let distance = if action == PointerAction::HoverExit { 0.0 } else { MOUSE_HOVER_DISTANCE };
        PointerEvent::new(action, vec![self.mouse_sample(x, y, distance)], time_ms)
            .with_buttons(StylusButtons {
                primary: self.mouse.right,
                secondary: false,
            })
            .with_source(SourceHint::Mouse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finger(id: u64, x: f32, y: f32) -> PointerSample {
        PointerSample::new(PointerId(id), x, y, ToolHint::Finger)
    }

    // ── touches ─────────────────────────────────────────────────────────

    #[test]
    fn second_finger_down_carries_both() {
        let mut t = PointerTracker::new();
        t.contact(ContactPhase::Started, finger(1, 0.0, 0.0), 0).unwrap();
        let ev = t.contact(ContactPhase::Started, finger(2, 10.0, 0.0), 5).unwrap();
        assert_eq!(ev.action, PointerAction::Down);
        assert_eq!(ev.pointer_count(), 2);
        assert_eq!(ev.action_index, 1);
        assert_eq!(ev.source, SourceHint::Touchscreen);
    }

    #[test]
    fn up_includes_lifting_pointer_then_forgets_it() {
        let mut t = PointerTracker::new();
        t.contact(ContactPhase::Started, finger(1, 0.0, 0.0), 0);
        t.contact(ContactPhase::Started, finger(2, 10.0, 0.0), 0);
        let ev = t.contact(ContactPhase::Ended, finger(1, 1.0, 1.0), 10).unwrap();
        assert_eq!(ev.action, PointerAction::Up);
        assert_eq!(ev.action_pointer().map(|p| p.id), Some(PointerId(1)));
        assert_eq!(t.contacts().len(), 1);
    }

    #[test]
    fn unknown_contact_moves_are_dropped() {
        let mut t = PointerTracker::new();
        assert!(t.contact(ContactPhase::Moved, finger(9, 0.0, 0.0), 0).is_none());
    }

    #[test]
    fn cancel_clears_all_contacts() {
        let mut t = PointerTracker::new();
        t.contact(ContactPhase::Started, finger(1, 0.0, 0.0), 0);
        t.contact(ContactPhase::Started, finger(2, 0.0, 0.0), 0);
        let ev = t.contact(ContactPhase::Cancelled, finger(2, 0.0, 0.0), 3).unwrap();
        assert_eq!(ev.action, PointerAction::Cancel);
        assert!(ev.canceled);
        assert!(t.contacts().is_empty());
    }

    // ── mouse as stylus ─────────────────────────────────────────────────

    #[test]
    fn mouse_hovers_then_draws() {
        let mut t = PointerTracker::new();
        let hover = t.mouse_moved(5.0, 5.0, 0);
        assert_eq!(hover[0].action, PointerAction::HoverEnter);
        assert!(hover[0].pointers[0].distance > 0.0);
        assert_eq!(t.mouse_moved(6.0, 5.0, 1)[0].action, PointerAction::HoverMove);

        let down = t.mouse_button(true, true, 2);
        let actions: Vec<_> = down.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![PointerAction::HoverExit, PointerAction::Down]);
        assert_eq!(down[1].pointers[0].tool, ToolHint::Stylus);

        assert_eq!(t.mouse_moved(9.0, 5.0, 3)[0].action, PointerAction::Move);
        let up = t.mouse_button(true, false, 4);
        assert_eq!(up[0].action, PointerAction::Up);
        assert_eq!(t.mouse_moved(9.0, 6.0, 5)[0].action, PointerAction::HoverEnter);
    }

    #[test]
    fn right_button_while_drawing_is_primary() {
        let mut t = PointerTracker::new();
        t.mouse_moved(0.0, 0.0, 0);
        t.mouse_button(true, true, 1);
        let ev = t.mouse_button(false, true, 2);
        assert_eq!(ev[0].action, PointerAction::Move);
        assert!(ev[0].buttons.primary);
    }

    #[test]
    fn mouse_button_without_position_is_ignored() {
        let mut t = PointerTracker::new();
        assert!(t.mouse_button(true, true, 0).is_empty());
    }
}
