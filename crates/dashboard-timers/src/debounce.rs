//! Trailing-edge debounce on top of a `Scheduler`

use std::time::Duration;

use crate::queue::{Scheduler, TimerId};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the quiet period; only the last task triggered before it
    /// elapses will fire
    pub fn trigger<T, S>(&mut self, scheduler: &mut S, task: T) -> TimerId
    where
        S: Scheduler<T> + ?Sized,
    {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        let id = scheduler.schedule_after(self.delay, task);
        self.pending = Some(id);
        id
    }

    /// Called by the owner when the debounced task fires
    pub fn settle(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ms, TimerQueue};

    #[test]
    fn test_burst_collapses_to_last_trigger() {
        let mut queue: TimerQueue<u32> = TimerQueue::new();
        let mut debouncer = Debouncer::new(ms(250));

        debouncer.trigger(&mut queue, 1u32);
        queue.advance(ms(100), |_, _| {});
        debouncer.trigger(&mut queue, 2u32);
        queue.advance(ms(100), |_, _| {});
        debouncer.trigger(&mut queue, 3u32);
        assert_eq!(queue.pending(), 1);

        let mut fired = Vec::new();
        queue.advance(ms(249), |_, t| fired.push(t));
        assert!(fired.is_empty());

        queue.advance(ms(1), |_, t| fired.push(t));
        assert_eq!(fired, vec![3]);
        assert_eq!(queue.now(), ms(450));
    }

    #[test]
    fn test_settle_clears_pending() {
        let mut queue: TimerQueue<u32> = TimerQueue::new();
        let mut debouncer = Debouncer::new(ms(100));

        debouncer.trigger(&mut queue, 1u32);
        assert!(debouncer.is_pending());
        queue.advance(ms(100), |_, _| {});
        debouncer.settle();
        assert!(!debouncer.is_pending());
    }
}
