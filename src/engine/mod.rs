mod hsm;
mod utils;


use heapless::Vec;
use statig::blocking::{IntoStateMachineExt as _, StateMachine};

use crate::config::{GestureConfig, TuningParams, MAX_TRACKED_POINTERS};
use crate::listener::{DoubleTapListener, GestureListener, NoDoubleTap};
use crate::timer::{TimerKind, TimerTable};
use crate::types::{FlingAction, FlingEvent, GestureError, PointerId, TouchAction, TouchSample};
use crate::velocity::VelocityTracker;

use hsm::{DispatchContext, GestureCallback, PointerHsm, PointerHsmEvent, TimerOp};

#[derive(Clone, Copy, Debug, Default)]
struct SlotBinding {
    pointer_id: Option<PointerId>,
    still_down: bool,
}

/// Multi-pointer gesture recognizer. Consumes one touch sample per call and
/// drives per-slot state machines, a shared velocity estimator, the timer
/// table, and the fling-event table; gesture callbacks go to the owned
/// listener(s).
///
/// The engine is a pure reactive state machine: nothing blocks, and timers
/// fire only from [`GestureEngine::poll_timers`], on the same logical thread
/// as sample dispatch.
pub struct GestureEngine<L, D = NoDoubleTap>
where
    L: GestureListener,
    D: DoubleTapListener,
{
    config: GestureConfig,
    listener: L,
    double_tap: Option<D>,
    slots: Vec<StateMachine<PointerHsm>, MAX_TRACKED_POINTERS>,
    bindings: Vec<SlotBinding, MAX_TRACKED_POINTERS>,
    fling_events: Vec<FlingEvent, MAX_TRACKED_POINTERS>,
    timers: TimerTable,
    velocity: VelocityTracker,
}

impl<L> GestureEngine<L, NoDoubleTap>
where
    L: GestureListener,
{
    /// Builds an engine with the primary capability set only. Double-tap
    /// detection and tap confirmation stay disarmed.
    pub fn new(config: GestureConfig, listener: L) -> Result<Self, GestureError> {
        Self::build(config, listener, None)
    }
}

impl<L, D> GestureEngine<L, D>
where
    L: GestureListener,
    D: DoubleTapListener,
{
    /// Builds an engine with both capability sets registered.
    pub fn with_double_tap(
        config: GestureConfig,
        listener: L,
        double_tap: D,
    ) -> Result<Self, GestureError> {
        Self::build(config, listener, Some(double_tap))
    }

    fn build(
        config: GestureConfig,
        listener: L,
        double_tap: Option<D>,
    ) -> Result<Self, GestureError> {
        config.validate()?;
        let mut slots = Vec::new();
        let mut bindings = Vec::new();
        let mut fling_events = Vec::new();
        for _ in 0..config.pointer_capacity {
            let _ = slots.push(PointerHsm::new().state_machine());
            let _ = bindings.push(SlotBinding::default());
            let _ = fling_events.push(FlingEvent::default());
        }
        Ok(Self {
            config,
            listener,
            double_tap,
            slots,
            bindings,
            fling_events,
            timers: TimerTable::new(config.pointer_capacity),
            velocity: VelocityTracker::new(config.pointer_capacity),
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Runtime reconfiguration of the tunable thresholds; rejected parameter
    /// sets leave the engine untouched.
    pub fn set_params(&mut self, params: TuningParams) -> Result<(), GestureError> {
        self.config.apply(params)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn double_tap_listener(&self) -> Option<&D> {
        self.double_tap.as_ref()
    }

    pub fn double_tap_listener_mut(&mut self) -> Option<&mut D> {
        self.double_tap.as_mut()
    }

    /// The shared per-slot fling table. Outside an `on_fling` callback every
    /// entry reads `FlingAction::None` or `Started`.
    pub fn fling_events(&self) -> &[FlingEvent] {
        &self.fling_events
    }

    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Dispatches one sample. Returns true when any listener reported the
    /// gesture as handled.
    pub fn handle(&mut self, sample: TouchSample) -> bool {
        match sample.action {
            TouchAction::Down | TouchAction::PointerDown => self.handle_down(sample),
            TouchAction::Move => self.handle_move(sample),
            TouchAction::Up | TouchAction::PointerUp => {
                self.handle_up(sample, sample.action == TouchAction::Up)
            }
            TouchAction::Cancel => {
                self.reset();
                false
            }
        }
    }

    /// Fires every timer due at `now_ms`, in deterministic order, and returns
    /// how many fired.
    pub fn poll_timers(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some((kind, slot)) = self.timers.pop_due(now_ms) {
            fired += 1;
            let pointer = self.bindings[slot].pointer_id.unwrap_or(0);
            self.dispatch(slot, pointer, PointerHsmEvent::Timer { kind }, (0, 0));
        }
        fired
    }

    /// Global reset, also applied on a Cancel sample: every pending timer is
    /// cancelled, the velocity history dropped, all fling entries cleared, and
    /// every slot returned to idle. Down/up snapshots survive; no callback
    /// fires.
    pub fn reset(&mut self) {
        log::debug!("gesture engine reset");
        self.timers.cancel_all();
        self.velocity.reset();
        for event in self.fling_events.iter_mut() {
            event.clear();
        }
        for slot in 0..self.slots.len() {
            let pointer = self.bindings[slot].pointer_id.unwrap_or(0);
            self.bindings[slot].still_down = false;
            self.dispatch(slot, pointer, PointerHsmEvent::Cancel, (0, 0));
        }
    }

    fn handle_down(&mut self, sample: TouchSample) -> bool {
        let Some(slot) = self.bind_slot(sample.pointer_id) else {
            log::warn!(
                "pointer pool exhausted, ignoring down for pointer {}",
                sample.pointer_id
            );
            return false;
        };
        self.velocity.clear_slot(slot);
        self.velocity
            .add_sample(slot, sample.x, sample.y, sample.t_ms);
        self.mark_started(slot);
        self.bindings[slot].still_down = true;
        self.dispatch(
            slot,
            sample.pointer_id,
            PointerHsmEvent::Down { sample },
            (0, 0),
        )
    }

    fn handle_move(&mut self, sample: TouchSample) -> bool {
        let Some(slot) = self.slot_of(sample.pointer_id) else {
            return false;
        };
        if !self.bindings[slot].still_down {
            return false;
        }
        self.velocity
            .add_sample(slot, sample.x, sample.y, sample.t_ms);
        self.mark_started(slot);
        self.dispatch(
            slot,
            sample.pointer_id,
            PointerHsmEvent::Move { sample },
            (0, 0),
        )
    }

    fn handle_up(&mut self, sample: TouchSample, primary: bool) -> bool {
        let Some(slot) = self.slot_of(sample.pointer_id) else {
            return false;
        };
        self.velocity
            .add_sample(slot, sample.x, sample.y, sample.t_ms);
        self.mark_started(slot);
        let velocity = self.velocity.estimate(slot, self.config.max_fling_velocity);
        self.bindings[slot].still_down = false;
        let handled = self.dispatch(
            slot,
            sample.pointer_id,
            PointerHsmEvent::Up { sample, primary },
            velocity,
        );
        if primary {
            // The stream is over: the whole gesture's velocity history and
            // fling table go, and only tap timers stay armed (for double-tap
            // confirmation).
            self.velocity.reset();
            for slot in 0..self.slots.len() {
                self.timers.cancel(TimerKind::ShowPress, slot);
                self.timers.cancel(TimerKind::LongPress, slot);
            }
            for event in self.fling_events.iter_mut() {
                event.clear();
            }
        }
        handled
    }

    /// Slots stick to their pointer id across releases so a double tap's
    /// second down lands on the first tap's slot. New ids claim the first
    /// unbound slot, then the first bound-but-released slot; at capacity the
    /// down is ignored.
    fn bind_slot(&mut self, pointer: PointerId) -> Option<usize> {
        if let Some(slot) = self.slot_of(pointer) {
            return Some(slot);
        }
        if let Some(slot) = self
            .bindings
            .iter()
            .position(|binding| binding.pointer_id.is_none())
        {
            self.bindings[slot].pointer_id = Some(pointer);
            return Some(slot);
        }
        if let Some(slot) = self
            .bindings
            .iter()
            .position(|binding| !binding.still_down)
        {
            self.bindings[slot].pointer_id = Some(pointer);
            return Some(slot);
        }
        None
    }

    fn slot_of(&self, pointer: PointerId) -> Option<usize> {
        self.bindings
            .iter()
            .position(|binding| binding.pointer_id == Some(pointer))
    }

    fn mark_started(&mut self, slot: usize) {
        let event = &mut self.fling_events[slot];
        if event.action == FlingAction::None {
            event.action = FlingAction::Started;
        }
    }

    fn dispatch(
        &mut self,
        slot: usize,
        pointer: PointerId,
        event: PointerHsmEvent,
        velocity: (i32, i32),
    ) -> bool {
        let mut context = DispatchContext::new(
            self.config,
            self.double_tap.is_some(),
            self.timers.is_scheduled(TimerKind::Tap, slot),
            velocity,
        );
        self.slots[slot].handle_with_context(&event, &mut context);
        for op in context.timer_ops.iter() {
            match *op {
                TimerOp::Schedule { kind, deadline_ms } => {
                    self.timers.schedule(kind, slot, deadline_ms)
                }
                TimerOp::Cancel { kind } => self.timers.cancel(kind, slot),
            }
        }
        self.deliver(slot, pointer, &context.callbacks)
    }

    fn deliver(
        &mut self,
        slot: usize,
        pointer: PointerId,
        callbacks: &[GestureCallback],
    ) -> bool {
        let mut handled = false;
        for callback in callbacks {
            match *callback {
                GestureCallback::Down(sample) => {
                    handled |= self.listener.on_down(&sample, slot, pointer);
                }
                GestureCallback::ShowPress(sample) => {
                    self.listener.on_show_press(&sample, slot, pointer);
                }
                GestureCallback::SingleTapUp(sample) => {
                    handled |= self.listener.on_single_tap_up(&sample, slot, pointer);
                }
                GestureCallback::Scroll {
                    down,
                    current,
                    distance_x,
                    distance_y,
                } => {
                    handled |= self.listener.on_scroll(
                        &down,
                        &current,
                        slot,
                        pointer,
                        distance_x,
                        distance_y,
                    );
                }
                GestureCallback::LongPress(sample) => {
                    self.listener.on_long_press(&sample, slot, pointer);
                }
                GestureCallback::Fling {
                    down,
                    up,
                    velocity_x,
                    velocity_y,
                } => {
                    self.fling_events[slot].set(down, up, velocity_x, velocity_y);
                    handled |= self.listener.on_fling(&self.fling_events, slot, pointer);
                    self.fling_events[slot].clear();
                }
                GestureCallback::SingleTapConfirmed(sample) => {
                    if let Some(double_tap) = self.double_tap.as_mut() {
                        handled |= double_tap.on_single_tap_confirmed(&sample, slot, pointer);
                    }
                }
                GestureCallback::DoubleTap(sample) => {
                    if let Some(double_tap) = self.double_tap.as_mut() {
                        handled |= double_tap.on_double_tap(&sample, slot, pointer);
                    }
                }
                GestureCallback::DoubleTapEvent(sample) => {
                    if let Some(double_tap) = self.double_tap.as_mut() {
                        handled |= double_tap.on_double_tap_event(&sample, slot, pointer);
                    }
                }
            }
        }
        handled
    }
}
