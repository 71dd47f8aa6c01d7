use std::collections::VecDeque;

/// A step the scheduler has committed to the audio output, and when it sounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledStep {
    pub step: usize,
    pub time: f64, // transport seconds
}

/// FIFO from the scheduler to the animation consumer. Entries go in with
/// increasing times and leave from the front exactly once.
#[derive(Clone, Debug, Default)]
pub struct StepQueue {
    entries: VecDeque<ScheduledStep>,
}

impl StepQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: usize, time: f64) {
        debug_assert!(
            self.entries.back().is_none_or(|last| last.time <= time),
            "scheduled steps must be queued in time order"
        );
        self.entries.push_back(ScheduledStep { step, time });
    }

    #[cfg(test)]
    pub fn front(&self) -> Option<&ScheduledStep> {
        self.entries.front()
    }

    #[cfg(test)]
    pub fn pop_front(&mut self) -> Option<ScheduledStep> {
        self.entries.pop_front()
    }

    /// Pop the front entry only if it sounded strictly before `now`.
    pub fn pop_elapsed(&mut self, now: f64) -> Option<ScheduledStep> {
        match self.entries.front() {
            Some(front) if front.time < now => self.entries.pop_front(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledStep> {
        self.entries.iter()
    }
}
