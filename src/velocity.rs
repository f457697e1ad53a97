use heapless::{Deque, Vec};

use crate::config::MAX_TRACKED_POINTERS;

/// Velocities are expressed in pixels per this many milliseconds.
const VELOCITY_UNITS_MS: i64 = 1_000;
/// Samples older than this relative to the newest are discarded.
const VELOCITY_WINDOW_MS: u64 = 200;
const VELOCITY_MAX_SAMPLES: usize = 8;

#[derive(Clone, Copy, Debug)]
struct MotionPoint {
    x: i32,
    y: i32,
    t_ms: u64,
}

struct SlotWindow {
    samples: Deque<MotionPoint, VELOCITY_MAX_SAMPLES>,
}

impl SlotWindow {
    const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    fn push(&mut self, x: i32, y: i32, t_ms: u64) {
        // Regressive timestamps are clamped to the newest seen so a reordered
        // batch can never produce a negative time span.
        let t_ms = self.samples.back().map_or(t_ms, |last| t_ms.max(last.t_ms));

        if self.samples.is_full() {
            self.samples.pop_front();
        }
        while self
            .samples
            .front()
            .is_some_and(|first| t_ms.saturating_sub(first.t_ms) > VELOCITY_WINDOW_MS)
        {
            self.samples.pop_front();
        }
        let _ = self.samples.push_back(MotionPoint { x, y, t_ms });
    }

    fn estimate(&self, max_velocity: i32) -> (i32, i32) {
        if self.samples.len() < 2 {
            return (0, 0);
        }
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return (0, 0);
        };
        let dt_ms = last.t_ms.saturating_sub(first.t_ms) as i64;
        if dt_ms == 0 {
            return (0, 0);
        }
        let vx = (i64::from(last.x) - i64::from(first.x)) * VELOCITY_UNITS_MS / dt_ms;
        let vy = (i64::from(last.y) - i64::from(first.y)) * VELOCITY_UNITS_MS / dt_ms;
        let max = i64::from(max_velocity);
        (
            vx.clamp(-max, max) as i32,
            vy.clamp(-max, max) as i32,
        )
    }
}

/// Per-slot velocity estimator over a bounded trailing sample window.
pub struct VelocityTracker {
    windows: Vec<SlotWindow, MAX_TRACKED_POINTERS>,
}

impl VelocityTracker {
    pub fn new(slots: usize) -> Self {
        let mut windows = Vec::new();
        for _ in 0..slots.min(MAX_TRACKED_POINTERS) {
            let _ = windows.push(SlotWindow::new());
        }
        Self { windows }
    }

    pub fn add_sample(&mut self, slot: usize, x: i32, y: i32, t_ms: u64) {
        if let Some(window) = self.windows.get_mut(slot) {
            window.push(x, y, t_ms);
        }
    }

    /// Estimated (vx, vy) in px/s, each axis clamped to `max_velocity`.
    /// A slot with fewer than two samples reports zero.
    pub fn estimate(&self, slot: usize, max_velocity: i32) -> (i32, i32) {
        self.windows
            .get(slot)
            .map_or((0, 0), |window| window.estimate(max_velocity))
    }

    pub fn clear_slot(&mut self, slot: usize) {
        if let Some(window) = self.windows.get_mut(slot) {
            window.samples.clear();
        }
    }

    pub fn reset(&mut self) {
        for window in self.windows.iter_mut() {
            window.samples.clear();
        }
    }
}
