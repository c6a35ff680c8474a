//! Patent Dashboard Timers
//!
//! Deferred page work is modelled as task values in a queue driven by a
//! virtual clock, instead of callbacks fired by wall-clock timers:
//! - `schedule_after(delay, task)` is `setTimeout`
//! - `schedule_next_frame(task)` is `requestAnimationFrame`
//! - `advance(dt)` moves the clock and fires what became due, in order
//!
//! Hosts drive the clock from real time; tests drive it explicitly.

mod debounce;
mod queue;

pub use debounce::Debouncer;
pub use queue::{Scheduler, TimerId, TimerQueue, DEFAULT_FRAME_INTERVAL};

/// Milliseconds as a `Duration`
pub fn ms(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}
