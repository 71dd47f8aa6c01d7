use std::time::{Duration, Instant};

/// A callback that re-arms itself every `interval` until cancelled: the
/// scheduler timer and the display-frame request are both one of these.
/// The handle is the only state; cancelling it is synchronous.
#[derive(Clone, Debug)]
pub struct RepeatingTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTask {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_due: None }
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Due straight away, then every `interval`.
    pub fn arm_now(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    #[cfg(test)]
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// True when the task should run. It fires at most once per poll and is
    /// re-armed `interval` after `now`, so periods missed during a stall are
    /// not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
