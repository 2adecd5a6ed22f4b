use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time in milliseconds.
pub type TimePoint = u64;

/// Time source driving deferred work.
pub trait Clock {
    fn now(&self) -> TimePoint;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimePoint {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Virtual clock advanced explicitly; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<TimePoint>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: TimePoint) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    pub fn set(&self, now: TimePoint) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimePoint {
        self.now.get()
    }
}

/// Single-shot deadline. Cancelling an idle timer is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeadlineTimer {
    deadline: Option<TimePoint>,
}

impl DeadlineTimer {
    /// Arms the timer, replacing any earlier deadline.
    pub fn schedule(&mut self, now: TimePoint, delay: TimePoint) {
        self.deadline = Some(now.saturating_add(delay));
    }

    /// Disarms the timer. Returns `true` when a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<TimePoint> {
        self.deadline
    }

    #[must_use]
    pub fn is_due(&self, now: TimePoint) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Disarms and returns `true` once the deadline has been reached.
    pub fn fire_if_due(&mut self, now: TimePoint) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, DeadlineTimer, ManualClock};

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let observer = clock.clone();
        clock.advance(250);
        assert_eq!(observer.now(), 250);
    }

    #[test]
    fn timer_fires_once_at_deadline() {
        let mut timer = DeadlineTimer::default();
        timer.schedule(100, 50);
        assert!(!timer.fire_if_due(149));
        assert!(timer.fire_if_due(150));
        assert!(!timer.fire_if_due(500));
        assert!(!timer.is_armed());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timer = DeadlineTimer::default();
        timer.schedule(0, 10);
        assert!(timer.cancel());
        assert!(!timer.cancel());
        assert!(!timer.fire_if_due(10));
    }
}
