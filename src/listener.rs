use crate::types::{FlingEvent, PointerId, TouchSample};

/// Primary gesture capability set. Every callback identifies the pointer slot
/// and the platform pointer id it belongs to. Boolean returns mean "handled"
/// and are OR-ed into the engine's dispatch result.
///
/// All methods default to no-ops so implementors override only what they use.
pub trait GestureListener {
    fn on_down(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        let _ = (sample, slot, pointer);
        false
    }

    fn on_show_press(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) {
        let _ = (sample, slot, pointer);
    }

    fn on_single_tap_up(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        let _ = (sample, slot, pointer);
        false
    }

    /// `distance_x`/`distance_y` are the deltas since the last tracked
    /// position, previous minus current.
    fn on_scroll(
        &mut self,
        down: &TouchSample,
        current: &TouchSample,
        slot: usize,
        pointer: PointerId,
        distance_x: i32,
        distance_y: i32,
    ) -> bool {
        let _ = (down, current, slot, pointer, distance_x, distance_y);
        false
    }

    fn on_long_press(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) {
        let _ = (sample, slot, pointer);
    }

    /// Receives the whole per-slot fling table; the firing slot's entry holds
    /// `FlingAction::Fling` for the duration of the call.
    fn on_fling(&mut self, events: &[FlingEvent], slot: usize, pointer: PointerId) -> bool {
        let _ = (events, slot, pointer);
        false
    }
}

/// Optional secondary capability set. Registering one (via
/// `GestureEngine::with_double_tap`) is what arms tap-confirmation timers and
/// double-tap detection.
pub trait DoubleTapListener {
    fn on_single_tap_confirmed(
        &mut self,
        sample: &TouchSample,
        slot: usize,
        pointer: PointerId,
    ) -> bool {
        let _ = (sample, slot, pointer);
        false
    }

    /// Fired with the first tap's down sample when the second down qualifies.
    fn on_double_tap(&mut self, first_down: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        let _ = (first_down, slot, pointer);
        false
    }

    /// Forwards every sample of the second tap (down, moves, up).
    fn on_double_tap_event(
        &mut self,
        sample: &TouchSample,
        slot: usize,
        pointer: PointerId,
    ) -> bool {
        let _ = (sample, slot, pointer);
        false
    }
}

/// Placeholder secondary listener for engines built without double-tap
/// support.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDoubleTap;

impl DoubleTapListener for NoDoubleTap {}
