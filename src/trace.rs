//! CSV-style trace capture for host debugging: one bounded line per touch
//! sample or gesture callback, suitable for dumping over a serial console or
//! diffing in the replay tool.

use core::fmt::Write;

use crate::listener::{DoubleTapListener, GestureListener};
use crate::types::{FlingEvent, PointerId, TouchAction, TouchSample};

pub const TRACE_LINE_CAPACITY: usize = 96;
pub const TRACE_LOG_CAPACITY: usize = 128;

pub type TraceLine = heapless::String<TRACE_LINE_CAPACITY>;

pub fn action_label(action: TouchAction) -> &'static str {
    match action {
        TouchAction::Down => "down",
        TouchAction::Move => "move",
        TouchAction::Up => "up",
        TouchAction::PointerDown => "pointer_down",
        TouchAction::PointerUp => "pointer_up",
        TouchAction::Cancel => "cancel",
    }
}

pub fn sample_line(sample: &TouchSample) -> TraceLine {
    let mut line = TraceLine::new();
    let _ = write!(
        &mut line,
        "touch_sample,{},{},{},{},{},{}",
        sample.t_ms,
        action_label(sample.action),
        sample.pointer_id,
        sample.pointer_index,
        sample.x,
        sample.y
    );
    line
}

fn gesture_line(
    kind: &str,
    sample: &TouchSample,
    slot: usize,
    pointer: PointerId,
    extra: Option<(i32, i32)>,
) -> TraceLine {
    let mut line = TraceLine::new();
    let _ = write!(
        &mut line,
        "gesture,{},{},{},{},{},{}",
        sample.t_ms, kind, slot, pointer, sample.x, sample.y
    );
    if let Some((a, b)) = extra {
        let _ = write!(&mut line, ",{a},{b}");
    }
    line
}

/// Bounded gesture recorder. Registered as the engine's listener(s), it keeps
/// the most recent lines, dropping the oldest when full.
pub struct GestureLog {
    lines: heapless::Vec<TraceLine, TRACE_LOG_CAPACITY>,
    overflow: bool,
}

impl GestureLog {
    pub fn new() -> Self {
        Self {
            lines: heapless::Vec::new(),
            overflow: false,
        }
    }

    pub fn lines(&self) -> &[TraceLine] {
        &self.lines
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.overflow = false;
    }

    fn push(&mut self, line: TraceLine) {
        if self.lines.push(line.clone()).is_err() {
            self.overflow = true;
            let _ = self.lines.remove(0);
            let _ = self.lines.push(line);
        }
    }
}

impl Default for GestureLog {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureListener for GestureLog {
    fn on_down(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        self.push(gesture_line("down", sample, slot, pointer, None));
        false
    }

    fn on_show_press(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) {
        self.push(gesture_line("show_press", sample, slot, pointer, None));
    }

    fn on_single_tap_up(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        self.push(gesture_line("single_tap_up", sample, slot, pointer, None));
        false
    }

    fn on_scroll(
        &mut self,
        _down: &TouchSample,
        current: &TouchSample,
        slot: usize,
        pointer: PointerId,
        distance_x: i32,
        distance_y: i32,
    ) -> bool {
        self.push(gesture_line(
            "scroll",
            current,
            slot,
            pointer,
            Some((distance_x, distance_y)),
        ));
        false
    }

    fn on_long_press(&mut self, sample: &TouchSample, slot: usize, pointer: PointerId) {
        self.push(gesture_line("long_press", sample, slot, pointer, None));
    }

    fn on_fling(&mut self, events: &[FlingEvent], slot: usize, pointer: PointerId) -> bool {
        if let Some(up) = events.get(slot).and_then(|event| event.up) {
            let velocity = events
                .get(slot)
                .map(|event| (event.velocity_x, event.velocity_y));
            self.push(gesture_line("fling", &up, slot, pointer, velocity));
        }
        false
    }
}

impl DoubleTapListener for GestureLog {
    fn on_single_tap_confirmed(
        &mut self,
        sample: &TouchSample,
        slot: usize,
        pointer: PointerId,
    ) -> bool {
        self.push(gesture_line(
            "single_tap_confirmed",
            sample,
            slot,
            pointer,
            None,
        ));
        false
    }

    fn on_double_tap(&mut self, first_down: &TouchSample, slot: usize, pointer: PointerId) -> bool {
        self.push(gesture_line("double_tap", first_down, slot, pointer, None));
        false
    }

    fn on_double_tap_event(
        &mut self,
        sample: &TouchSample,
        slot: usize,
        pointer: PointerId,
    ) -> bool {
        self.push(gesture_line("double_tap_event", sample, slot, pointer, None));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(action: TouchAction, x: i32, y: i32, t_ms: u64) -> TouchSample {
        TouchSample {
            pointer_id: 3,
            pointer_index: 1,
            x,
            y,
            t_ms,
            action,
        }
    }

    #[test]
    fn sample_lines_are_stable() {
        let line = sample_line(&sample(TouchAction::PointerDown, 120, -4, 88));
        assert_eq!(line.as_str(), "touch_sample,88,pointer_down,3,1,120,-4");
    }

    #[test]
    fn gesture_lines_carry_slot_pointer_and_extras() {
        let mut log = GestureLog::new();
        let down = sample(TouchAction::Down, 10, 20, 5);
        log.on_down(&down, 0, 3);
        let current = sample(TouchAction::Move, 40, 20, 25);
        log.on_scroll(&down, &current, 0, 3, -30, 0);

        assert_eq!(log.lines()[0].as_str(), "gesture,5,down,0,3,10,20");
        assert_eq!(log.lines()[1].as_str(), "gesture,25,scroll,0,3,40,20,-30,0");
        assert!(!log.overflow());
    }

    #[test]
    fn overflowing_log_keeps_the_most_recent_lines() {
        let mut log = GestureLog::new();
        for i in 0..(TRACE_LOG_CAPACITY + 4) {
            let down = sample(TouchAction::Down, i as i32, 0, i as u64);
            log.on_down(&down, 0, 1);
        }
        assert!(log.overflow());
        assert_eq!(log.lines().len(), TRACE_LOG_CAPACITY);
        let last = log.lines().last().unwrap();
        assert!(last.as_str().starts_with("gesture,131,"));
    }
}
