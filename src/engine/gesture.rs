// src/engine/gesture.rs
//
// Pointer/touch input -> TransformState deltas.
// No drawing, no storage: `transition` is a pure function and the controller
// is a thin stateful wrapper that adds per-frame coalescing of move events.

use super::transform::{clamp_scale, Point, TransformState, ROTATION_STEP};

/// Damping applied to the raw two-finger distance ratio.
pub const PINCH_DAMPING: f64 = 0.4;
/// Scale change per zoom button press.
pub const ZOOM_STEP: f64 = 0.05;

/// Raw input delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Mouse/pen press over the image
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// Current touch points after a touchstart
    TouchStart(Vec<Point>),
    /// Current touch points after a touchmove
    TouchMove(Vec<Point>),
    /// Touch points still down after a touchend/touchcancel
    TouchEnd(Vec<Point>),
    ZoomIn,
    ZoomOut,
    /// Slider position
    ZoomTo(f64),
    RotateLeft,
    RotateRight,
    Reset,
}

impl GestureEvent {
    /// Continuous events that may be superseded by a later one in the same frame.
    pub fn is_move(&self) -> bool {
        matches!(self, Self::PointerMove(_) | Self::TouchMove(_))
    }
}

/// Transient tracking that is never persisted with the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureTracking {
    pub drag_anchor: Option<Point>,
    pub pinch: Option<PinchStart>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchStart {
    pub distance: f64,
    pub scale: f64,
}

impl GestureTracking {
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }
}

/// Pure transition: `(event, tracking, state) -> (tracking', state')`.
pub fn transition(
    event: &GestureEvent,
    tracking: GestureTracking,
    state: TransformState,
) -> (GestureTracking, TransformState) {
    let mut tracking = tracking;
    let mut state = state;

    match event {
        GestureEvent::PointerDown(pos) => {
            tracking.drag_anchor = Some(*pos - state.pan);
        }
        GestureEvent::PointerMove(pos) => {
            if let Some(anchor) = tracking.drag_anchor {
                state.pan = *pos - anchor;
            }
        }
        GestureEvent::PointerUp => {
            tracking.drag_anchor = None;
        }
        GestureEvent::TouchStart(touches) => match touches.as_slice() {
            [single] => {
                tracking.pinch = None;
                tracking.drag_anchor = Some(*single - state.pan);
            }
            [a, b, ..] => {
                tracking.drag_anchor = None;
                tracking.pinch = pinch_start(*a, *b, state.scale);
            }
            [] => {}
        },
        GestureEvent::TouchMove(touches) => match touches.as_slice() {
            [single] => {
                if let Some(anchor) = tracking.drag_anchor {
                    state.pan = *single - anchor;
                }
            }
            [a, b, ..] => {
                if let Some(start) = tracking.pinch {
                    let ratio = a.distance_to(*b) / start.distance;
                    state.scale = clamp_scale(
                        (ratio * PINCH_DAMPING + (1.0 - PINCH_DAMPING)) * start.scale,
                    );
                }
            }
            [] => {}
        },
        GestureEvent::TouchEnd(remaining) => {
            tracking.pinch = None;
            // A finger lifted mid-pinch hands over to a drag of the survivor.
            tracking.drag_anchor = match remaining.as_slice() {
                [single] => Some(*single - state.pan),
                _ => None,
            };
        }
        GestureEvent::ZoomIn => state.set_scale(state.scale + ZOOM_STEP),
        GestureEvent::ZoomOut => state.set_scale(state.scale - ZOOM_STEP),
        GestureEvent::ZoomTo(scale) => state.set_scale(*scale),
        GestureEvent::RotateLeft => state.rotate_by(-ROTATION_STEP),
        GestureEvent::RotateRight => state.rotate_by(ROTATION_STEP),
        GestureEvent::Reset => state.reset(),
    }

    (tracking, state)
}

fn pinch_start(a: Point, b: Point, scale: f64) -> Option<PinchStart> {
    let distance = a.distance_to(b);
    // Two touches on the same spot give no usable ratio.
    if distance > 0.0 && distance.is_finite() {
        Some(PinchStart { distance, scale })
    } else {
        None
    }
}

/// Stateful wrapper used by the editor.
///
/// Move events queued with [`GestureController::queue`] are coalesced until
/// [`GestureController::flush_frame`]; only the latest one is applied.
#[derive(Debug, Default)]
pub struct GestureController {
    tracking: GestureTracking,
    pending_move: Option<GestureEvent>,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracking(&self) -> GestureTracking {
        self.tracking
    }

    /// Apply one event immediately.
    pub fn handle(&mut self, event: &GestureEvent, state: &mut TransformState) {
        tracing::trace!(?event, "gesture");
        let (tracking, next) = transition(event, self.tracking, *state);
        self.tracking = tracking;
        *state = next;
    }

    /// Queue an event for the next frame. Moves replace any pending move;
    /// anything else flushes the pending move and applies at once.
    pub fn queue(&mut self, event: GestureEvent, state: &mut TransformState) {
        if event.is_move() {
            self.pending_move = Some(event);
            return;
        }
        self.flush_frame(state);
        self.handle(&event, state);
    }

    /// Apply the latest pending move, if any. Returns whether one was applied.
    pub fn flush_frame(&mut self, state: &mut TransformState) -> bool {
        match self.pending_move.take() {
            Some(event) => {
                self.handle(&event, state);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending_move.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transform::{MAX_SCALE, MIN_SCALE};

    fn run(events: &[GestureEvent]) -> TransformState {
        let mut controller = GestureController::new();
        let mut state = TransformState::default();
        for event in events {
            controller.handle(event, &mut state);
        }
        state
    }

    #[test]
    fn drag_moves_pan_by_pointer_delta() {
        let state = run(&[
            GestureEvent::PointerDown(Point::new(100.0, 100.0)),
            GestureEvent::PointerMove(Point::new(130.0, 90.0)),
            GestureEvent::PointerMove(Point::new(160.0, 80.0)),
            GestureEvent::PointerUp,
            GestureEvent::PointerMove(Point::new(500.0, 500.0)),
        ]);
        assert_eq!(state.pan, Point::new(60.0, -20.0));
    }

    #[test]
    fn second_drag_continues_from_current_pan() {
        let state = run(&[
            GestureEvent::PointerDown(Point::new(0.0, 0.0)),
            GestureEvent::PointerMove(Point::new(10.0, 10.0)),
            GestureEvent::PointerUp,
            GestureEvent::PointerDown(Point::new(50.0, 50.0)),
            GestureEvent::PointerMove(Point::new(55.0, 40.0)),
        ]);
        assert_eq!(state.pan, Point::new(15.0, 0.0));
    }

    #[test]
    fn pan_is_unclamped() {
        let state = run(&[
            GestureEvent::PointerDown(Point::ZERO),
            GestureEvent::PointerMove(Point::new(-90_000.0, 45_000.0)),
        ]);
        assert_eq!(state.pan, Point::new(-90_000.0, 45_000.0));
    }

    #[test]
    fn pinch_ratio_two_gives_one_point_four() {
        let state = run(&[
            GestureEvent::TouchStart(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
            GestureEvent::TouchMove(vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)]),
        ]);
        assert!((state.scale - 1.4).abs() < 1e-12);
    }

    #[test]
    fn pinch_is_relative_to_start_scale_and_clamped() {
        let mut controller = GestureController::new();
        let mut state = TransformState::new(4.0, 0, Point::ZERO);
        controller.handle(
            &GestureEvent::TouchStart(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
            &mut state,
        );
        controller.handle(
            &GestureEvent::TouchMove(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
            &mut state,
        );
        assert_eq!(state.scale, MAX_SCALE);

        controller.handle(
            &GestureEvent::TouchMove(vec![Point::new(0.0, 0.0), Point::new(0.1, 0.0)]),
            &mut state,
        );
        // (0.01 * 0.4 + 0.6) * 4.0
        assert!((state.scale - 2.416).abs() < 1e-9);
    }

    #[test]
    fn zero_distance_pinch_is_ignored() {
        let state = run(&[
            GestureEvent::TouchStart(vec![Point::new(5.0, 5.0), Point::new(5.0, 5.0)]),
            GestureEvent::TouchMove(vec![Point::new(0.0, 0.0), Point::new(300.0, 0.0)]),
        ]);
        assert_eq!(state.scale, 1.0);
    }

    #[test]
    fn single_touch_drags() {
        let state = run(&[
            GestureEvent::TouchStart(vec![Point::new(10.0, 10.0)]),
            GestureEvent::TouchMove(vec![Point::new(25.0, 5.0)]),
            GestureEvent::TouchEnd(vec![]),
        ]);
        assert_eq!(state.pan, Point::new(15.0, -5.0));
    }

    #[test]
    fn lifting_one_finger_hands_over_to_drag() {
        let mut controller = GestureController::new();
        let mut state = TransformState::default();
        controller.handle(
            &GestureEvent::TouchStart(vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)]),
            &mut state,
        );
        controller.handle(
            &GestureEvent::TouchEnd(vec![Point::new(50.0, 0.0)]),
            &mut state,
        );
        assert!(controller.tracking().is_dragging());
        assert!(!controller.tracking().is_pinching());
        controller.handle(
            &GestureEvent::TouchMove(vec![Point::new(60.0, 10.0)]),
            &mut state,
        );
        assert_eq!(state.pan, Point::new(10.0, 10.0));
    }

    #[test]
    fn zoom_buttons_step_and_clamp() {
        let state = run(&[GestureEvent::ZoomIn, GestureEvent::ZoomIn]);
        assert!((state.scale - 1.1).abs() < 1e-12);

        let state = run(&[GestureEvent::ZoomTo(0.12), GestureEvent::ZoomOut]);
        assert_eq!(state.scale, MIN_SCALE);

        let state = run(&[GestureEvent::ZoomTo(9.0)]);
        assert_eq!(state.scale, MAX_SCALE);
    }

    #[test]
    fn rotation_accumulates_and_reset_restores_defaults() {
        let presses = vec![GestureEvent::RotateRight; 5];
        assert_eq!(run(&presses).rotation_degrees, 450);

        let state = run(&[GestureEvent::RotateLeft, GestureEvent::RotateLeft]);
        assert_eq!(state.rotation_degrees, -180);

        let state = run(&[
            GestureEvent::RotateRight,
            GestureEvent::ZoomTo(3.0),
            GestureEvent::PointerDown(Point::ZERO),
            GestureEvent::PointerMove(Point::new(9.0, 9.0)),
            GestureEvent::Reset,
        ]);
        assert_eq!(state, TransformState::default());
    }

    #[test]
    fn queued_moves_coalesce_to_last() {
        let mut controller = GestureController::new();
        let mut state = TransformState::default();
        controller.queue(GestureEvent::PointerDown(Point::ZERO), &mut state);
        controller.queue(GestureEvent::PointerMove(Point::new(1.0, 1.0)), &mut state);
        controller.queue(GestureEvent::PointerMove(Point::new(2.0, 2.0)), &mut state);
        controller.queue(GestureEvent::PointerMove(Point::new(7.0, 3.0)), &mut state);
        assert_eq!(state.pan, Point::ZERO);
        assert!(controller.has_pending());

        assert!(controller.flush_frame(&mut state));
        assert_eq!(state.pan, Point::new(7.0, 3.0));
        assert!(!controller.flush_frame(&mut state));
    }

    #[test]
    fn non_move_event_flushes_pending_move_first() {
        let mut controller = GestureController::new();
        let mut state = TransformState::default();
        controller.queue(GestureEvent::PointerDown(Point::ZERO), &mut state);
        controller.queue(GestureEvent::PointerMove(Point::new(4.0, 4.0)), &mut state);
        controller.queue(GestureEvent::PointerUp, &mut state);
        assert_eq!(state.pan, Point::new(4.0, 4.0));
        assert!(!controller.tracking().is_dragging());
    }
}
