use super::*;
use crate::coords::{PageSize, Vec2, ViewTransform};
use crate::ink::{InkPage, Stroke, StrokeId, StrokePoint, StrokeStyle, Tool, PREDICTED_ALPHA_FACTOR};
use crate::input::{PointerAction, PointerEvent, PointerId, PointerSample, StylusButtons, ToolHint};
use crate::render::{render_queue, RedrawMode, RenderCommand, RenderInbox};

#[derive(Default)]
struct Recorder {
    finished: Vec<Stroke>,
    render_finished: Vec<StrokeId>,
    erased: Vec<Stroke>,
    splits: Vec<(Stroke, Vec<Stroke>)>,
    transforms: Vec<TransformGesture>,
    eraser_flags: Vec<bool>,
    double_taps: usize,
    undos: usize,
    redos: usize,
}

impl InkListener for Recorder {
    fn on_stroke_finished(&mut self, stroke: Stroke) {
        self.finished.push(stroke);
    }
    fn on_stroke_render_finished(&mut self, id: StrokeId) {
        self.render_finished.push(id);
    }
    fn on_stroke_erased(&mut self, stroke: Stroke) {
        self.erased.push(stroke);
    }
    fn on_stroke_split(&mut self, original: Stroke, segments: Vec<Stroke>) {
        self.splits.push((original, segments));
    }
    fn on_transform_gesture(&mut self, gesture: TransformGesture) {
        self.transforms.push(gesture);
    }
    fn on_stylus_button_eraser_active_changed(&mut self, active: bool) {
        self.eraser_flags.push(active);
    }
    fn on_double_tap(&mut self) {
        self.double_taps += 1;
    }
    fn on_undo_shortcut(&mut self) {
        self.undos += 1;
    }
    fn on_redo_shortcut(&mut self) {
        self.redos += 1;
    }
}

/// Always predicts a point far off any page.
struct WildPredictor {
    last: Option<PointerEvent>,
}

impl MotionPredictor for WildPredictor {
    fn record(&mut self, event: &PointerEvent) {
        self.last = Some(event.clone());
    }
    fn predict(&self) -> Option<PointerEvent> {
        let mut ev = self.last.clone()?;
        ev.action = PointerAction::Move;
        for p in &mut ev.pointers {
            p.x = 9999.0;
            p.y = -9999.0;
            p.history.clear();
        }
        Some(ev)
    }
    fn reset(&mut self) {
        self.last = None;
    }
}

struct Harness {
    router: GestureRouter,
    inbox: RenderInbox,
    transform: ViewTransform,
    page: InkPage,
    brush: StrokeStyle,
    segment_eraser: bool,
    finger_gestures: bool,
    rec: Recorder,
}

impl Harness {
    fn new(settings: InputSettings) -> Self {
        Self::with_predictor(settings, Box::new(NoMotionPredictor))
    }

    fn with_predictor(settings: InputSettings, predictor: Box<dyn MotionPredictor>) -> Self {
        let (queue, inbox) = render_queue();
        Self {
            router: GestureRouter::new(settings, predictor, queue),
            inbox,
            transform: ViewTransform::IDENTITY,
            page: InkPage::new(PageSize::default()),
            brush: StrokeStyle::default(),
            segment_eraser: false,
            finger_gestures: true,
            rec: Recorder::default(),
        }
    }

    fn on_page(mut self, w: f32, h: f32) -> Self {
        self.page = InkPage::new(PageSize::new(w, h));
        self
    }

    fn send(&mut self, ev: PointerEvent) -> bool {
        let mut ctx = RouterCtx::new(self.brush, &mut self.transform, &self.page)
            .with_segment_eraser(self.segment_eraser)
            .with_finger_gestures(self.finger_gestures);
        self.router.handle(&ev, &mut ctx, &mut self.rec)
    }

    fn commands(&self) -> Vec<RenderCommand> {
        self.inbox.drain().collect()
    }

    /// Down, moves, up for the stylus along `path`.
    fn draw(&mut self, path: &[(f32, f32)], t0: u64) {
        let Some((&first, rest)) = path.split_first() else {
            return;
        };
        self.send(ev(PointerAction::Down, vec![stylus(first.0, first.1)], t0));
        let mut t = t0;
        for &(x, y) in rest {
            t += 8;
            self.send(ev(PointerAction::Move, vec![stylus(x, y)], t));
        }
        let last = path[path.len() - 1];
        self.send(ev(PointerAction::Up, vec![stylus(last.0, last.1)], t + 8));
    }
}

fn stylus(x: f32, y: f32) -> PointerSample {
    PointerSample::new(PointerId(1), x, y, ToolHint::Stylus).with_pressure(0.5)
}

fn finger(id: u64, x: f32, y: f32) -> PointerSample {
    PointerSample::new(PointerId(id), x, y, ToolHint::Finger)
}

fn ev(action: PointerAction, pointers: Vec<PointerSample>, t: u64) -> PointerEvent {
    PointerEvent::new(action, pointers, t)
}

fn line(id: StrokeId, from: (f32, f32), to: (f32, f32)) -> Stroke {
    let points = (0..=8)
        .map(|i| {
            let f = i as f32 / 8.0;
            StrokePoint::at(from.0 + (to.0 - from.0) * f, from.1 + (to.1 - from.1) * f, i)
        })
        .collect();
    Stroke::from_points(id, points, StrokeStyle::default(), 2.0, 0).expect("stroke")
}

// ── pan ─────────────────────────────────────────────────────────────────

#[test]
fn single_finger_pan_emits_one_transform() {
    let mut h = Harness::new(InputSettings::default());
    assert!(h.send(ev(PointerAction::Down, vec![finger(7, 10.0, 20.0)], 0)));
    assert!(h.send(ev(PointerAction::Move, vec![finger(7, 10.0, 20.0)], 8)));
    assert!(h.send(ev(PointerAction::Move, vec![finger(7, 22.0, 44.0)], 16)));
    assert_eq!(h.router.state(), GestureState::SingleFingerPanning);
    assert!(h.send(ev(PointerAction::Up, vec![finger(7, 22.0, 44.0)], 24)));

    assert_eq!(
        h.rec.transforms,
        vec![TransformGesture {
            zoom_change: 1.0,
            pan_change: Vec2::new(12.0, 24.0),
            centroid: Vec2::new(22.0, 44.0),
        }]
    );
    assert!(h.rec.finished.is_empty() && h.rec.erased.is_empty());
    assert_eq!(h.transform, ViewTransform::new(1.0, 12.0, 24.0));
    assert_eq!(h.router.state(), GestureState::Idle);
    assert!(h
        .commands()
        .contains(&RenderCommand::SetViewTransform(ViewTransform::new(1.0, 12.0, 24.0))));
}

#[test]
fn two_quick_taps_are_a_double_tap() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![finger(1, 50.0, 50.0)], 0));
    h.send(ev(PointerAction::Up, vec![finger(1, 52.0, 50.0)], 60));
    h.send(ev(PointerAction::Down, vec![finger(2, 55.0, 48.0)], 150));
    h.send(ev(PointerAction::Up, vec![finger(2, 55.0, 48.0)], 200));
    assert_eq!(h.rec.double_taps, 1);
}

#[test]
fn slow_second_tap_is_not_a_double_tap() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![finger(1, 50.0, 50.0)], 0));
    h.send(ev(PointerAction::Up, vec![finger(1, 50.0, 50.0)], 40));
    h.send(ev(PointerAction::Down, vec![finger(2, 50.0, 50.0)], 400));
    h.send(ev(PointerAction::Up, vec![finger(2, 50.0, 50.0)], 420));
    assert_eq!(h.rec.double_taps, 0);
}

// ── transform ───────────────────────────────────────────────────────────

#[test]
fn pinch_zooms_about_centroid() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![finger(1, 100.0, 100.0)], 0));
    let both = vec![finger(1, 100.0, 100.0), finger(2, 200.0, 100.0)];
    assert!(h.send(ev(PointerAction::Down, both, 10).with_action_index(1)));
    assert_eq!(h.router.state(), GestureState::Transforming);

    let spread = vec![finger(1, 50.0, 100.0), finger(2, 250.0, 100.0)];
    assert!(h.send(ev(PointerAction::Move, spread, 30)));

    let g = h.rec.transforms.last().copied().expect("transform");
    assert_eq!(g.zoom_change, 2.0);
    assert_eq!(g.pan_change, Vec2::zero());
    assert_eq!(g.centroid, Vec2::new(150.0, 100.0));
    assert_eq!(h.transform.zoom, 2.0);
    // The page point under the centroid stays put.
    assert_eq!(h.transform.page_to_screen(Vec2::new(150.0, 100.0)), Vec2::new(150.0, 100.0));
}

#[test]
fn zoom_change_is_clamped_per_step() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![finger(1, 100.0, 100.0)], 0));
    h.send(ev(PointerAction::Down, vec![finger(1, 100.0, 100.0), finger(2, 110.0, 100.0)], 5).with_action_index(1));
    h.send(ev(PointerAction::Move, vec![finger(1, 0.0, 100.0), finger(2, 210.0, 100.0)], 20));
    assert_eq!(h.rec.transforms[0].zoom_change, 2.0);
}

#[test]
fn pinch_rebaselines_on_remaining_two() {
    let mut h = Harness::new(InputSettings::default());
    let a = finger(1, 0.0, 0.0);
    let b = finger(2, 100.0, 0.0);
    let c = finger(3, 0.0, 100.0);
    h.send(ev(PointerAction::Down, vec![a.clone()], 0));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone()], 5).with_action_index(1));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone(), c.clone()], 10).with_action_index(2));
    h.send(ev(PointerAction::Up, vec![a, b.clone(), c.clone()], 400).with_action_index(0));

    assert_eq!(h.router.state(), GestureState::Transforming);
    let pinch = h.router.sessions.pinch.expect("baseline");
    assert_eq!((pinch.a, pinch.b), (PointerId(2), PointerId(3)));
    assert_eq!(pinch.centroid, Vec2::new(50.0, 50.0));

    // One more lift leaves a single finger: the transform ends.
    h.send(ev(PointerAction::Up, vec![b, c.clone()], 420).with_action_index(0));
    assert_eq!(h.router.state(), GestureState::Idle);
    // The leftover finger is ignored until it lifts.
    assert!(!h.send(ev(PointerAction::Move, vec![finger(3, 30.0, 140.0)], 430)));
    assert!(!h.send(ev(PointerAction::Up, vec![c], 440)));
    assert!(h.rec.finished.is_empty());
}

#[test]
fn second_finger_cancels_in_progress_stroke() {
    let settings = InputSettings::default().with_single_finger_mode(SingleFingerMode::Draw);
    let mut h = Harness::new(settings);
    h.send(ev(PointerAction::Down, vec![finger(1, 10.0, 10.0)], 0));
    let stroke = h.router.sessions().active_stroke(PointerId(1)).expect("drawing");
    h.send(ev(PointerAction::Down, vec![finger(1, 10.0, 10.0), finger(2, 60.0, 10.0)], 20).with_action_index(1));

    assert_eq!(h.router.state(), GestureState::Transforming);
    assert!(h.router.sessions().is_pointer_clear(PointerId(1)));
    assert!(h.commands().contains(&RenderCommand::CancelStroke { id: stroke }));
}

#[test]
fn quick_two_finger_tap_undoes_three_redoes() {
    let mut h = Harness::new(InputSettings::default());
    let a = finger(1, 100.0, 100.0);
    let b = finger(2, 140.0, 100.0);
    h.send(ev(PointerAction::Down, vec![a.clone()], 0));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone()], 10).with_action_index(1));
    h.send(ev(PointerAction::Up, vec![a.clone(), b.clone()], 120).with_action_index(1));
    h.send(ev(PointerAction::Up, vec![a.clone()], 130));
    assert_eq!((h.rec.undos, h.rec.redos), (1, 0));

    let c = finger(3, 120.0, 140.0);
    h.send(ev(PointerAction::Down, vec![a.clone()], 1000));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone()], 1005).with_action_index(1));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone(), c.clone()], 1010).with_action_index(2));
    h.send(ev(PointerAction::Up, vec![a.clone(), b.clone(), c], 1100).with_action_index(2));
    h.send(ev(PointerAction::Up, vec![a.clone(), b], 1110).with_action_index(1));
    assert_eq!((h.rec.undos, h.rec.redos), (1, 1));
}

#[test]
fn long_two_finger_press_is_not_a_tap() {
    let mut h = Harness::new(InputSettings::default());
    let a = finger(1, 100.0, 100.0);
    let b = finger(2, 140.0, 100.0);
    h.send(ev(PointerAction::Down, vec![a.clone()], 0));
    h.send(ev(PointerAction::Down, vec![a.clone(), b.clone()], 10).with_action_index(1));
    h.send(ev(PointerAction::Up, vec![a, b], 600).with_action_index(1));
    assert_eq!(h.rec.undos, 0);
}

// ── drawing ─────────────────────────────────────────────────────────────

#[test]
fn stylus_stroke_finishes_and_clears_pointer_maps() {
    let mut h = Harness::new(InputSettings::default());
    h.draw(&[(10.0, 10.0), (20.0, 12.0), (30.0, 15.0)], 100);

    assert_eq!(h.rec.finished.len(), 1);
    let stroke = &h.rec.finished[0];
    assert_eq!(stroke.len(), 3);
    assert_eq!(stroke.created_at, 100);
    assert_eq!(stroke.points[0].pressure, Some(0.5));
    assert_eq!(h.rec.render_finished, vec![stroke.id]);
    assert!(h.router.sessions().is_pointer_clear(PointerId(1)));
    assert!(h.router.sessions().is_empty());

    let cmds = h.commands();
    assert!(matches!(cmds.first(), Some(RenderCommand::StartStroke { alpha, .. }) if *alpha == 1.0));
    assert!(cmds.contains(&RenderCommand::FinishStroke { id: stroke.id }));
}

#[test]
fn pointer_maps_hold_one_lifecycle_at_a_time() {
    let mut h = Harness::new(InputSettings::default());
    for round in 0..5u64 {
        let t = round * 100;
        h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], t));
        assert!(h.router.sessions().active_stroke(PointerId(1)).is_some());
        h.send(ev(PointerAction::Move, vec![stylus(20.0, 10.0)], t + 8));
        if round % 2 == 0 {
            h.send(ev(PointerAction::Up, vec![stylus(20.0, 10.0)], t + 16));
        } else {
            h.send(ev(PointerAction::Cancel, vec![], t + 16));
        }
        assert!(h.router.sessions().is_pointer_clear(PointerId(1)), "round {round}");
    }
    assert_eq!(h.rec.finished.len(), 3);
}

#[test]
fn duplicate_positions_are_collapsed() {
    let mut h = Harness::new(InputSettings::default());
    h.draw(&[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0), (11.0, 10.0)], 0);
    assert_eq!(h.rec.finished[0].len(), 2);
}

#[test]
fn cancel_discards_active_stroke() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], 0));
    let id = h.router.sessions().active_stroke(PointerId(1)).expect("active");
    h.send(ev(PointerAction::Move, vec![stylus(20.0, 10.0)], 8));
    assert!(h.send(ev(PointerAction::Cancel, vec![], 16)));

    assert!(h.rec.finished.is_empty());
    assert!(h.router.sessions().is_empty());
    assert!(h.commands().contains(&RenderCommand::CancelStroke { id }));
}

#[test]
fn repeated_down_cancels_the_abandoned_stroke() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], 0));
    let first = h.router.sessions().active_stroke(PointerId(1)).expect("first");
    h.send(ev(PointerAction::Move, vec![stylus(20.0, 10.0)], 8));

    h.send(ev(PointerAction::Down, vec![stylus(40.0, 40.0)], 16));
    let second = h.router.sessions().active_stroke(PointerId(1)).expect("second");
    assert_ne!(first, second);
    assert!(h.commands().contains(&RenderCommand::CancelStroke { id: first }));

    h.send(ev(PointerAction::Up, vec![stylus(50.0, 40.0)], 24));
    assert_eq!(h.rec.finished.len(), 1);
    assert_eq!(h.rec.finished[0].id, second);
    assert!(h.router.sessions().is_empty());
}

#[test]
fn cancelled_up_discards_instead_of_finishing() {
    let mut h = Harness::new(InputSettings::default());
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], 0));
    h.send(ev(PointerAction::Move, vec![stylus(20.0, 10.0)], 8));
    h.send(ev(PointerAction::Up, vec![stylus(20.0, 10.0)], 16).canceled());
    assert!(h.rec.finished.is_empty());
    assert!(h.router.sessions().is_empty());
}

#[test]
fn palm_sized_stylus_contact_is_ignored() {
    let mut h = Harness::new(InputSettings::default());
    assert!(!h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0).with_size(1.5)], 0)));
    assert!(h.router.sessions().is_empty());
}

#[test]
fn finger_draws_only_in_draw_mode() {
    let mut h = Harness::new(InputSettings::default().with_single_finger_mode(SingleFingerMode::Ignore));
    assert!(!h.send(ev(PointerAction::Down, vec![finger(4, 10.0, 10.0)], 0)));

    let mut h = Harness::new(InputSettings::default().with_single_finger_mode(SingleFingerMode::Draw));
    h.send(ev(PointerAction::Down, vec![finger(4, 10.0, 10.0)], 0));
    h.send(ev(PointerAction::Move, vec![finger(4, 30.0, 10.0)], 8));
    h.send(ev(PointerAction::Up, vec![finger(4, 30.0, 10.0)], 16));
    assert_eq!(h.rec.finished.len(), 1);
}

#[test]
fn finger_gestures_can_be_disabled() {
    let mut h = Harness::new(InputSettings::default());
    h.finger_gestures = false;
    assert!(!h.send(ev(PointerAction::Down, vec![finger(1, 10.0, 10.0)], 0)));
    assert_eq!(h.router.state(), GestureState::Idle);
    h.draw(&[(10.0, 10.0), (20.0, 10.0)], 10);
    assert_eq!(h.rec.finished.len(), 1);
}

#[test]
fn empty_batches_are_no_ops() {
    let mut h = Harness::new(InputSettings::default());
    assert!(!h.send(ev(PointerAction::Move, vec![], 0)));
    assert!(!h.send(ev(PointerAction::Down, vec![], 0)));
    assert!(h.commands().is_empty());
}

#[test]
fn redraw_mode_follows_activity() {
    let mut h = Harness::new(InputSettings::default());
    assert_eq!(h.router.redraw_mode(), RedrawMode::OnDemand);
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], 0));
    assert_eq!(h.router.redraw_mode(), RedrawMode::Continuous);
    h.send(ev(PointerAction::Up, vec![stylus(10.0, 10.0)], 8));
    assert_eq!(h.router.redraw_mode(), RedrawMode::OnDemand);
}

// ── page bounds ─────────────────────────────────────────────────────────

#[test]
fn near_edge_start_is_accepted() {
    let mut h = Harness::new(InputSettings::default()).on_page(100.0, 100.0);
    h.draw(&[(101.0, 50.0), (90.0, 50.0)], 0);
    assert_eq!(h.rec.finished.len(), 1);
    assert_eq!(h.rec.finished[0].points[0].pos(), Vec2::new(100.0, 50.0));
}

#[test]
fn off_page_start_is_rejected() {
    let mut h = Harness::new(InputSettings::default()).on_page(100.0, 100.0);
    h.draw(&[(150.0, 150.0), (160.0, 160.0)], 0);
    assert!(h.rec.finished.is_empty());
    assert!(h.router.sessions().is_empty());
}

#[test]
fn drift_off_page_is_clamped() {
    let mut h = Harness::new(InputSettings::default()).on_page(100.0, 100.0);
    h.draw(&[(50.0, 50.0), (80.0, 90.0), (160.0, 180.0)], 0);
    let stroke = &h.rec.finished[0];
    assert_eq!(stroke.points.last().map(StrokePoint::pos), Some(Vec2::new(100.0, 100.0)));
    assert!(stroke.points.iter().all(|p| p.x <= 100.0 && p.y <= 100.0));
}

// ── prediction ──────────────────────────────────────────────────────────

#[test]
fn predicted_points_never_reach_the_finished_stroke() {
    let mut h = Harness::with_predictor(InputSettings::default(), Box::new(WildPredictor { last: None }));
    for i in 0..10 {
        let t = i * 8;
        let action = if i == 0 { PointerAction::Down } else { PointerAction::Move };
        h.send(ev(action, vec![stylus(10.0 + i as f32, 10.0)], t));
        if i > 0 {
            assert!(h.router.sessions().predicted_stroke(PointerId(1)).is_some());
            let buffered = h.router.sessions().buffered_points(PointerId(1)).expect("capture");
            assert!(buffered.iter().all(|p| p.x < 100.0 && p.y > 0.0));
        }
    }
    h.send(ev(PointerAction::Up, vec![stylus(20.0, 10.0)], 100));

    let stroke = &h.rec.finished[0];
    assert!(stroke.points.iter().all(|p| p.x != 9999.0 && p.y != -9999.0));
    assert!(h.router.sessions().predicted_stroke(PointerId(1)).is_none());

    let cmds = h.commands();
    let predicted_ids: Vec<StrokeId> = cmds
        .iter()
        .filter_map(|c| match c {
            RenderCommand::StartStroke { id, alpha, .. } if *alpha == PREDICTED_ALPHA_FACTOR => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(predicted_ids.len(), 9);
    for id in predicted_ids {
        assert!(cmds.contains(&RenderCommand::CancelStroke { id }));
    }
}

// ── erasing ─────────────────────────────────────────────────────────────

#[test]
fn eraser_tool_reports_hit_strokes() {
    let mut h = Harness::new(InputSettings::default());
    let hit = StrokeId::new();
    let miss = StrokeId::new();
    h.page.add(line(hit, (10.0, 10.0), (90.0, 10.0)));
    h.page.add(line(miss, (10.0, 80.0), (90.0, 80.0)));
    h.brush = h.brush.with_tool(Tool::Eraser);

    h.send(ev(PointerAction::Down, vec![stylus(50.0, 14.0)], 0));
    assert_eq!(h.router.state(), GestureState::Erasing);
    h.send(ev(PointerAction::Up, vec![stylus(50.0, 14.0)], 8));

    let ids: Vec<StrokeId> = h.rec.erased.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![hit]);
    assert!(h.rec.finished.is_empty());
    assert!(h.router.sessions().is_empty());
}

#[test]
fn eraser_radius_is_constant_on_screen() {
    let mut h = Harness::new(InputSettings::default());
    h.page.add(line(StrokeId::new(), (10.0, 10.0), (90.0, 10.0)));
    h.brush = h.brush.with_tool(Tool::Eraser);
    h.transform = ViewTransform::new(4.0, 0.0, 0.0);
    // 8 page units away is 32 screen px at 4x: out of reach.
    h.send(ev(PointerAction::Down, vec![stylus(200.0, 72.0)], 0));
    h.send(ev(PointerAction::Up, vec![stylus(200.0, 72.0)], 8));
    assert!(h.rec.erased.is_empty());
}

#[test]
fn segment_eraser_splits_crossed_stroke() {
    let mut h = Harness::new(InputSettings::default());
    let id = StrokeId::new();
    h.page.add(line(id, (0.0, 50.0), (80.0, 50.0)));
    h.brush = h.brush.with_tool(Tool::Eraser);
    h.segment_eraser = true;

    h.send(ev(PointerAction::Down, vec![stylus(40.0, 20.0)], 0));
    h.send(ev(PointerAction::Move, vec![stylus(40.0, 80.0)], 8));
    h.send(ev(PointerAction::Up, vec![stylus(40.0, 80.0)], 16));

    assert_eq!(h.rec.splits.len(), 1);
    let (original, segments) = &h.rec.splits[0];
    assert_eq!(original.id, id);
    assert_eq!(segments.len(), 2);
    assert!(h.rec.erased.is_empty());
}

#[test]
fn button_press_promotes_stroke_to_eraser() {
    let mut h = Harness::new(InputSettings::default());
    let victim = StrokeId::new();
    h.page.add(line(victim, (60.0, 0.0), (60.0, 100.0)));
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 50.0)], 0));
    let drawing = h.router.sessions().active_stroke(PointerId(1)).expect("drawing");

    let pressed = StylusButtons {
        primary: true,
        secondary: false,
    };
    h.send(ev(PointerAction::Move, vec![stylus(60.0, 50.0)], 8).with_buttons(pressed));
    assert_eq!(h.router.sessions().mode(PointerId(1)), Some(super::PointerMode::Erase));
    assert!(h.commands().contains(&RenderCommand::CancelStroke { id: drawing }));
    assert_eq!(h.rec.erased.iter().map(|s| s.id).collect::<Vec<_>>(), vec![victim]);

    h.send(ev(PointerAction::Up, vec![stylus(60.0, 50.0)], 16));
    assert!(h.rec.finished.is_empty());
    assert_eq!(h.rec.eraser_flags, vec![true, false]);
}

#[test]
fn long_hold_turns_on_button_eraser() {
    let settings = InputSettings::default().with_long_hold_action(StylusButtonAction::EraserHold);
    let mut h = Harness::new(settings);
    h.send(ev(PointerAction::Down, vec![stylus(10.0, 10.0)], 0));
    h.send(ev(PointerAction::Move, vec![stylus(10.5, 10.0)], 200));
    assert!(!h.router.sessions().is_button_eraser_active());
    h.send(ev(PointerAction::Move, vec![stylus(11.0, 10.0)], 400));
    assert!(h.router.sessions().is_button_eraser_active());
    h.send(ev(PointerAction::Up, vec![stylus(11.0, 10.0)], 420));
    assert!(!h.router.sessions().is_button_eraser_active());
    assert_eq!(h.rec.eraser_flags, vec![true, false]);
    assert!(h.router.sessions().is_empty());
}

// ── hover ───────────────────────────────────────────────────────────────

#[test]
fn hover_preview_tracks_stylus_in_range() {
    let mut h = Harness::new(InputSettings::default());
    let hovering = stylus(30.0, 40.0).with_distance(4.0);
    assert!(h.send(ev(PointerAction::HoverEnter, vec![hovering], 0)));
    assert_eq!(h.router.state(), GestureState::Hovering);
    let preview = h.router.sessions().hover().expect("preview");
    assert_eq!(preview.center, Vec2::new(30.0, 40.0));
    assert_eq!(preview.radius, 1.0);
    assert_eq!(preview.color, h.brush.color);

    assert!(h.send(ev(PointerAction::HoverExit, vec![stylus(30.0, 40.0)], 8)));
    assert!(h.router.sessions().hover().is_none());
    let overlays = h
        .commands()
        .into_iter()
        .filter(|c| matches!(c, RenderCommand::SetOverlay(_)))
        .count();
    assert_eq!(overlays, 2);
}

#[test]
fn finger_hover_shows_nothing() {
    let mut h = Harness::new(InputSettings::default());
    assert!(!h.send(ev(PointerAction::HoverMove, vec![finger(1, 5.0, 5.0).with_distance(2.0)], 0)));
    assert!(h.router.sessions().hover().is_none());
}
