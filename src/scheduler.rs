//! Clock and repeating-timer scheduler
//!
//! Everything runs on one logical thread. Timers never fire on their own:
//! the owner polls `pop_due` with the current clock reading and dispatches
//! each fire itself, so a handler that cancels timers takes effect before
//! the next fire is popped.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Monotonic time source, measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock (native only)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// What a timer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Physics tick
    Tick,
    /// Periodic entity spawn
    Spawn,
    /// Continuous movement while a direction is held
    HoldMove,
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    interval: Duration,
    next_due: Duration,
}

/// Repeating timers, fired earliest-due first (ties by creation order)
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a repeating timer whose first fire is one interval after `now`
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        interval: Duration,
        now: Duration,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // A zero interval would fire forever within a single poll
        debug_assert!(!interval.is_zero(), "timer interval must be non-zero");
        self.timers.push(Timer {
            id,
            kind,
            interval,
            next_due: now + interval,
        });
        id
    }

    /// Cancel a timer; returns false if it was not active
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of active timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `now` and reschedule it
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerKind> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due <= now)
            .min_by_key(|t| (t.next_due, t.id))?;
        timer.next_due += timer.interval;
        Some(timer.kind)
    }

    /// Drop any backlog still due, realigning each timer after `now`
    pub fn skip_backlog(&mut self, now: Duration) -> u32 {
        let mut skipped = 0;
        for timer in &mut self.timers {
            while timer.next_due <= now {
                timer.next_due += timer.interval;
                skipped += 1;
            }
        }
        skipped
    }
}
