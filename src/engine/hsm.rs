use heapless::Vec;
use statig::prelude::*;

use super::utils::{squared, squared_distance};
use crate::config::{GestureConfig, BIGGER_TOUCH_SLOP_PX};
use crate::timer::TimerKind;
use crate::types::TouchSample;

pub(crate) const CALLBACK_BUFFER: usize = 8;
pub(crate) const TIMER_OP_BUFFER: usize = 8;

/// Callback intent collected during a transition and delivered by the engine
/// after state mutation settles. Samples are snapshotted by value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum GestureCallback {
    Down(TouchSample),
    ShowPress(TouchSample),
    SingleTapUp(TouchSample),
    Scroll {
        down: TouchSample,
        current: TouchSample,
        distance_x: i32,
        distance_y: i32,
    },
    LongPress(TouchSample),
    Fling {
        down: TouchSample,
        up: TouchSample,
        velocity_x: i32,
        velocity_y: i32,
    },
    SingleTapConfirmed(TouchSample),
    DoubleTap(TouchSample),
    DoubleTapEvent(TouchSample),
}

/// Declarative timer intent; the slot is implied by the machine under
/// dispatch.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TimerOp {
    Schedule { kind: TimerKind, deadline_ms: u64 },
    Cancel { kind: TimerKind },
}

pub(crate) struct DispatchContext {
    pub(crate) config: GestureConfig,
    pub(crate) double_tap_registered: bool,
    pub(crate) tap_timer_pending: bool,
    pub(crate) velocity: (i32, i32),
    pub(crate) callbacks: Vec<GestureCallback, CALLBACK_BUFFER>,
    pub(crate) timer_ops: Vec<TimerOp, TIMER_OP_BUFFER>,
}

impl DispatchContext {
    pub(crate) fn new(
        config: GestureConfig,
        double_tap_registered: bool,
        tap_timer_pending: bool,
        velocity: (i32, i32),
    ) -> Self {
        Self {
            config,
            double_tap_registered,
            tap_timer_pending,
            velocity,
            callbacks: Vec::new(),
            timer_ops: Vec::new(),
        }
    }

    fn emit(&mut self, callback: GestureCallback) {
        let _ = self.callbacks.push(callback);
    }

    fn schedule(&mut self, kind: TimerKind, deadline_ms: u64) {
        let _ = self.timer_ops.push(TimerOp::Schedule { kind, deadline_ms });
    }

    fn cancel(&mut self, kind: TimerKind) {
        let _ = self.timer_ops.push(TimerOp::Cancel { kind });
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum PointerHsmEvent {
    Down { sample: TouchSample },
    Move { sample: TouchSample },
    Up { sample: TouchSample, primary: bool },
    Cancel,
    Timer { kind: TimerKind },
}

/// Per-slot gesture record. Down/up snapshots survive across gestures so a
/// later down can qualify as a double tap; flags reset field-by-field on each
/// press. The slot itself is allocated once and never moves.
pub(crate) struct PointerHsm {
    current_down: Option<TouchSample>,
    previous_up: Option<TouchSample>,
    last_x: i32,
    last_y: i32,
    always_in_bigger_tap_region: bool,
    is_double_tapping: bool,
}

impl PointerHsm {
    pub(crate) fn new() -> Self {
        Self {
            current_down: None,
            previous_up: None,
            last_x: 0,
            last_y: 0,
            always_in_bigger_tap_region: false,
            is_double_tapping: false,
        }
    }

    fn begin_press(&mut self, context: &mut DispatchContext, sample: TouchSample) {
        self.is_double_tapping = false;

        if context.double_tap_registered {
            let had_tap_timer = context.tap_timer_pending;
            if had_tap_timer {
                context.cancel(TimerKind::Tap);
            }
            if had_tap_timer && self.is_considered_double_tap(context, sample) {
                self.is_double_tapping = true;
                if let Some(first_down) = self.current_down {
                    context.emit(GestureCallback::DoubleTap(first_down));
                }
                context.emit(GestureCallback::DoubleTapEvent(sample));
            } else {
                context.schedule(
                    TimerKind::Tap,
                    sample.t_ms + context.config.double_tap_timeout_ms,
                );
            }
        }

        self.last_x = sample.x;
        self.last_y = sample.y;
        self.current_down = Some(sample);
        self.always_in_bigger_tap_region = true;

        context.cancel(TimerKind::LongPress);
        if context.config.long_press_enabled {
            context.schedule(
                TimerKind::LongPress,
                sample.t_ms + context.config.tap_timeout_ms + context.config.long_press_timeout_ms,
            );
        }
        context.schedule(
            TimerKind::ShowPress,
            sample.t_ms + context.config.tap_timeout_ms,
        );
        context.emit(GestureCallback::Down(sample));
    }

    /// All three conditions must hold: the first tap never left the bigger tap
    /// region, the new down follows the previous up within the double-tap
    /// timeout, and the two downs are within the double-tap slop.
    fn is_considered_double_tap(
        &self,
        context: &DispatchContext,
        second_down: TouchSample,
    ) -> bool {
        if !self.always_in_bigger_tap_region {
            return false;
        }
        let (Some(first_down), Some(previous_up)) = (self.current_down, self.previous_up) else {
            return false;
        };
        if second_down.t_ms.saturating_sub(previous_up.t_ms) > context.config.double_tap_timeout_ms
        {
            return false;
        }
        squared_distance(first_down.x, first_down.y, second_down.x, second_down.y)
            <= context.config.double_tap_slop_sq()
    }

    fn track_bigger_region(&mut self, sample: TouchSample) {
        let Some(down) = self.current_down else {
            return;
        };
        if squared_distance(sample.x, sample.y, down.x, down.y) > squared(BIGGER_TOUCH_SLOP_PX) {
            self.always_in_bigger_tap_region = false;
        }
    }

    fn finish_up(&mut self, sample: TouchSample, primary: bool) {
        self.previous_up = Some(sample);
        if primary {
            self.is_double_tapping = false;
        }
    }

    fn abort(&mut self) {
        self.is_double_tapping = false;
    }
}

#[state_machine(initial = "State::idle()")]
impl PointerHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &PointerHsmEvent) -> Outcome<State> {
        match event {
            PointerHsmEvent::Down { sample } => {
                self.begin_press(context, *sample);
                Transition(State::pressed())
            }
            PointerHsmEvent::Timer {
                kind: TimerKind::Tap,
            } => {
                // The pointer is no longer down, so the pending tap is final.
                if context.double_tap_registered {
                    if let Some(down) = self.current_down {
                        context.emit(GestureCallback::SingleTapConfirmed(down));
                    }
                }
                Handled
            }
            PointerHsmEvent::Cancel => {
                self.abort();
                Handled
            }
            _ => Handled,
        }
    }

    #[state(superstate = "touching")]
    fn pressed(
        &mut self,
        context: &mut DispatchContext,
        event: &PointerHsmEvent,
    ) -> Outcome<State> {
        match event {
            PointerHsmEvent::Move { sample } => {
                if self.is_double_tapping {
                    context.emit(GestureCallback::DoubleTapEvent(*sample));
                    return Handled;
                }
                let Some(down) = self.current_down else {
                    return Handled;
                };
                self.track_bigger_region(*sample);
                let distance_sq = squared_distance(sample.x, sample.y, down.x, down.y);
                if distance_sq > context.config.touch_slop_sq() {
                    // The sample that crosses the slop also carries the first
                    // scroll.
                    let distance_x = self.last_x - sample.x;
                    let distance_y = self.last_y - sample.y;
                    context.emit(GestureCallback::Scroll {
                        down,
                        current: *sample,
                        distance_x,
                        distance_y,
                    });
                    self.last_x = sample.x;
                    self.last_y = sample.y;
                    context.cancel(TimerKind::Tap);
                    context.cancel(TimerKind::ShowPress);
                    context.cancel(TimerKind::LongPress);
                    return Transition(State::scrolling());
                }
                Handled
            }
            PointerHsmEvent::Up { sample, primary } => {
                if self.is_double_tapping {
                    context.emit(GestureCallback::DoubleTapEvent(*sample));
                } else {
                    context.emit(GestureCallback::SingleTapUp(*sample));
                }
                self.finish_up(*sample, *primary);
                Transition(State::idle())
            }
            PointerHsmEvent::Timer {
                kind: TimerKind::LongPress,
            } => {
                context.cancel(TimerKind::Tap);
                if let Some(down) = self.current_down {
                    context.emit(GestureCallback::LongPress(down));
                }
                Transition(State::long_press())
            }
            _ => Super,
        }
    }

    #[state(superstate = "touching")]
    fn scrolling(
        &mut self,
        context: &mut DispatchContext,
        event: &PointerHsmEvent,
    ) -> Outcome<State> {
        match event {
            PointerHsmEvent::Move { sample } => {
                let Some(down) = self.current_down else {
                    return Handled;
                };
                self.track_bigger_region(*sample);
                let distance_x = self.last_x - sample.x;
                let distance_y = self.last_y - sample.y;
                // Sub-pixel jitter accumulates until either axis reaches one
                // pixel of travel.
                if distance_x.abs() >= 1 || distance_y.abs() >= 1 {
                    context.emit(GestureCallback::Scroll {
                        down,
                        current: *sample,
                        distance_x,
                        distance_y,
                    });
                    self.last_x = sample.x;
                    self.last_y = sample.y;
                }
                Handled
            }
            PointerHsmEvent::Up { sample, primary } => {
                if self.is_double_tapping {
                    context.emit(GestureCallback::DoubleTapEvent(*sample));
                } else {
                    let (velocity_x, velocity_y) = context.velocity;
                    if velocity_y.abs() > context.config.min_fling_velocity
                        || velocity_x.abs() > context.config.min_fling_velocity
                    {
                        if let Some(down) = self.current_down {
                            context.emit(GestureCallback::Fling {
                                down,
                                up: *sample,
                                velocity_x,
                                velocity_y,
                            });
                        }
                    }
                }
                self.finish_up(*sample, *primary);
                Transition(State::idle())
            }
            _ => Super,
        }
    }

    #[state(superstate = "touching")]
    fn long_press(
        &mut self,
        context: &mut DispatchContext,
        event: &PointerHsmEvent,
    ) -> Outcome<State> {
        match event {
            // Moves are not processed while the long press holds.
            PointerHsmEvent::Move { .. } => Handled,
            PointerHsmEvent::Up { sample, primary } => {
                if self.is_double_tapping {
                    context.emit(GestureCallback::DoubleTapEvent(*sample));
                } else {
                    // The long press already fired; the release only retires
                    // the pending tap.
                    context.cancel(TimerKind::Tap);
                }
                self.finish_up(*sample, *primary);
                Transition(State::idle())
            }
            _ => Super,
        }
    }

    #[superstate]
    fn touching(
        &mut self,
        context: &mut DispatchContext,
        event: &PointerHsmEvent,
    ) -> Outcome<State> {
        match event {
            PointerHsmEvent::Down { sample } => {
                // A down without an observed release restarts the gesture.
                self.begin_press(context, *sample);
                Transition(State::pressed())
            }
            PointerHsmEvent::Cancel => {
                self.abort();
                Transition(State::idle())
            }
            PointerHsmEvent::Timer {
                kind: TimerKind::ShowPress,
            } => {
                if let Some(down) = self.current_down {
                    context.emit(GestureCallback::ShowPress(down));
                }
                Handled
            }
            // A tap timer firing while the pointer is still down confirms
            // nothing.
            _ => Handled,
        }
    }
}
