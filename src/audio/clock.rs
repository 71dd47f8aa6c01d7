use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically advancing audio-rate clock, in seconds.
pub trait AudioClock {
    fn now(&self) -> f64;
}

/// Reads the number of frames the output stream has rendered so far. The
/// audio callback is the only writer.
#[derive(Clone, Debug)]
pub struct StreamClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl StreamClock {
    pub fn new(frames: Arc<AtomicU64>, sample_rate: u32) -> Self {
        Self { frames, sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    // nearest frame to a clock time; negative times land on frame 0
    pub fn frame_at(&self, time: f64) -> u64 {
        (time * self.sample_rate as f64).round().max(0.0) as u64
    }
}

impl AudioClock for StreamClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Hand-driven clock for exercising the scheduler without an audio device.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::cell::Cell<f64>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now: f64) -> Self {
        Self { now: std::cell::Cell::new(now) }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

#[cfg(test)]
impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
