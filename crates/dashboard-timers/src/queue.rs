//! Timer queue
//!
//! Tasks are ordered by `(deadline, sequence)`. A task never fires inside the
//! call that scheduled it, and two tasks due at the same instant fire in the
//! order they were scheduled.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// One frame at 60 Hz, rounded down
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// The two suspension primitives a page component may use
pub trait Scheduler<T> {
    fn now(&self) -> Duration;
    fn schedule_after(&mut self, delay: Duration, task: T) -> TimerId;
    fn schedule_next_frame(&mut self, task: T) -> TimerId;
    /// Returns false if the task already fired or was cancelled
    fn cancel(&mut self, id: TimerId) -> bool;
}

pub struct TimerQueue<T> {
    now: Duration,
    frame_interval: Duration,
    next_seq: u64,
    /// Min-heap of (deadline, sequence); cancelled entries are skipped lazily
    deadlines: BinaryHeap<Reverse<(Duration, u64)>>,
    tasks: HashMap<u64, T>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_interval,
            next_seq: 0,
            deadlines: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Number of live (not fired, not cancelled) tasks
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Deadline of the earliest live task
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.deadlines.peek().map(|Reverse((deadline, _))| *deadline)
    }

    pub fn push(&mut self, deadline: Duration, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.deadlines.push(Reverse((deadline.max(self.now), seq)));
        self.tasks.insert(seq, task);
        TimerId(seq)
    }

    pub fn schedule_after(&mut self, delay: Duration, task: T) -> TimerId {
        let deadline = self.now.saturating_add(delay);
        self.push(deadline, task)
    }

    pub fn schedule_next_frame(&mut self, task: T) -> TimerId {
        let deadline = self.next_frame_deadline();
        self.push(deadline, task)
    }

    /// Returns false if the task already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.tasks.remove(&id.0).is_some();
        if !removed {
            tracing::trace!(timer = ?id, "Cancel of inactive timer");
        }
        removed
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// deadline
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        loop {
            let Reverse((deadline, seq)) = *self.deadlines.peek()?;
            if deadline > until {
                return None;
            }
            self.deadlines.pop();
            if let Some(task) = self.tasks.remove(&seq) {
                self.now = self.now.max(deadline);
                return Some(task);
            }
        }
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance the clock by `dt`, handing every task that becomes due to
    /// `handler`. Tasks the handler schedules inside the window fire too.
    /// Returns the number of tasks fired.
    pub fn advance<F>(&mut self, dt: Duration, mut handler: F) -> usize
    where
        F: FnMut(&mut Self, T),
    {
        let target = self.now.saturating_add(dt);
        let mut fired = 0;
        while let Some(task) = self.pop_due(target) {
            handler(self, task);
            fired += 1;
        }
        self.set_now(target);
        fired
    }

    fn next_frame_deadline(&self) -> Duration {
        let frame = self.frame_interval.as_nanos();
        if frame == 0 {
            return self.now;
        }
        let next = (self.now.as_nanos() / frame + 1) * frame;
        Duration::from_nanos(next as u64)
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, seq))) = self.deadlines.peek() {
            if self.tasks.contains_key(seq) {
                break;
            }
            self.deadlines.pop();
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> Scheduler<T> for TimerQueue<U>
where
    U: From<T>,
{
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_after(&mut self, delay: Duration, task: T) -> TimerId {
        TimerQueue::schedule_after(self, delay, U::from(task))
    }

    fn schedule_next_frame(&mut self, task: T) -> TimerId {
        TimerQueue::schedule_next_frame(self, U::from(task))
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        TimerQueue::cancel(self, id)
    }
}
