//! Async driver for the gesture engine: feeds it from a channel of touch
//! samples and wakes on pending timer deadlines, keeping both event sources
//! on one logical task.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};

use crate::engine::GestureEngine;
use crate::listener::{DoubleTapListener, GestureListener};
use crate::types::TouchSample;

pub const PIPELINE_DEPTH: usize = 32;

#[derive(Clone, Copy, Debug)]
pub enum PipelineInput {
    Sample(TouchSample),
    /// Drops all in-flight gesture state, e.g. when the keyboard view goes
    /// away mid-touch.
    Reset,
}

pub type PipelineChannel = Channel<CriticalSectionRawMutex, PipelineInput, PIPELINE_DEPTH>;

/// Runs forever, draining `inputs` into the engine. Samples must be stamped
/// with the same millisecond base as `embassy_time::Instant` so timer
/// deadlines land on the wall clock.
pub async fn run_gesture_pipeline<L, D>(
    engine: &mut GestureEngine<L, D>,
    inputs: &PipelineChannel,
) -> !
where
    L: GestureListener,
    D: DoubleTapListener,
{
    loop {
        let input = match engine.next_timer_deadline() {
            Some(deadline_ms) => {
                let wake = Timer::at(Instant::from_millis(deadline_ms));
                match select(inputs.receive(), wake).await {
                    Either::First(input) => input,
                    Either::Second(()) => {
                        engine.poll_timers(Instant::now().as_millis());
                        continue;
                    }
                }
            }
            None => inputs.receive().await,
        };

        match input {
            PipelineInput::Sample(sample) => {
                // Deadlines that elapsed before this sample fire first, in
                // stream time.
                engine.poll_timers(sample.t_ms);
                engine.handle(sample);
            }
            PipelineInput::Reset => engine.reset(),
        }
    }
}
