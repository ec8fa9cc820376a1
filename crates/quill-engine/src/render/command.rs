use crossbeam::channel::{self, Receiver, Sender, TryIter};
use log::warn;

use crate::coords::{PageSize, ViewTransform};
use crate::ink::{Stroke, StrokeId, StrokePoint, StrokeStyle};

use super::overlay::OverlayState;

/// Intents the input side hands to the render side.
///
/// Nothing here carries a GPU handle; the store turns these into meshes on
/// whichever thread owns the device.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SetCommittedStrokes { strokes: Vec<Stroke>, page_size: PageSize },
    SetViewTransform(ViewTransform),
    StartStroke {
        id: StrokeId,
        point: StrokePoint,
        style: StrokeStyle,
        /// Multiplier on top of the style's own render alpha.
        alpha: f32,
    },
    AppendToStroke { id: StrokeId, point: StrokePoint },
    FinishStroke { id: StrokeId },
    CancelStroke { id: StrokeId },
    RemoveFinishedStrokes(Vec<StrokeId>),
    SetOverlay(OverlayState),
}

/// Sending half. Cheap to clone, never blocks.
#[derive(Debug, Clone)]
pub struct RenderQueue {
    sender: Sender<RenderCommand>,
}

/// Receiving half, drained once per frame.
#[derive(Debug)]
pub struct RenderInbox {
    receiver: Receiver<RenderCommand>,
}

/// Creates a connected queue/inbox pair.
pub fn render_queue() -> (RenderQueue, RenderInbox) {
    let (sender, receiver) = channel::unbounded();
    (RenderQueue { sender }, RenderInbox { receiver })
}

impl RenderQueue {
    pub fn send(&self, cmd: RenderCommand) {
        if self.sender.send(cmd).is_err() {
            warn!("render inbox dropped; command discarded");
        }
    }
}

impl RenderInbox {
    /// Commands queued so far, oldest first. Does not wait for more.
    pub fn drain(&self) -> TryIter<'_, RenderCommand> {
        self.receiver.try_iter()
    }

    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }
}
