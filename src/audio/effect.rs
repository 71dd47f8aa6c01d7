use serde::{Deserialize, Serialize};

use super::frame::StereoFrame;

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 20.0;
pub const DEFAULT_CUTOFF_HZ: f32 = 1000.0;
pub const DEFAULT_RESONANCE: f32 = 1.0;

pub trait Effect: Send {
    fn process(&mut self, buf: &mut [StereoFrame]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    LowPass,
    HighPass,
}

impl FilterKind {
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::LowPass => "LP",
            FilterKind::HighPass => "HP",
        }
    }
}

/// Settings of the one filter shared by every voice routed through it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSettings {
    pub kind: FilterKind,
    pub enabled: bool,
    pub cutoff_hz: f32,
    pub resonance: f32, // biquad Q
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            kind: FilterKind::LowPass,
            enabled: false,
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            resonance: DEFAULT_RESONANCE,
        }
    }
}

impl FilterSettings {
    // lowpass and highpass are exclusive: asking for the active kind turns the
    // filter off, asking for the other one switches to it
    pub fn toggle(&mut self, kind: FilterKind) {
        if self.enabled && self.kind == kind {
            self.enabled = false;
        } else {
            self.kind = kind;
            self.enabled = true;
        }
    }

    pub fn set_cutoff(&mut self, hz: f32) {
        if hz.is_finite() {
            self.cutoff_hz = hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        }
    }

    pub fn set_resonance(&mut self, q: f32) {
        if q.is_finite() {
            self.resonance = q.clamp(MIN_RESONANCE, MAX_RESONANCE);
        }
    }

    pub fn label(&self) -> String {
        if self.enabled {
            format!("{} {:.0}Hz Q{:.1}", self.kind.label(), self.cutoff_hz, self.resonance)
        } else {
            String::from("off")
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BiquadState {
    z1: f32,
    z2: f32,
}

/// RBJ cookbook biquad, transposed direct form II, one state per channel.
pub struct Biquad {
    sample_rate: f32,
    settings: FilterSettings,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    left: BiquadState,
    right: BiquadState,
}

impl Biquad {
    pub fn new(sample_rate: f32, settings: FilterSettings) -> Self {
        let mut filter = Self {
            sample_rate,
            settings,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            left: BiquadState::default(),
            right: BiquadState::default(),
        };
        filter.set(settings);
        filter
    }

    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    // recompute coefficients in place; the delay line is kept so a knob
    // sweep doesn't click
    pub fn set(&mut self, settings: FilterSettings) {
        self.settings = settings;
        let nyquist_guard = self.sample_rate * 0.45;
        let f0 = settings.cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist_guard.max(MIN_CUTOFF_HZ));
        let q = settings.resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);

        let w0 = std::f32::consts::TAU * f0 / self.sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1, b2) = match settings.kind {
            FilterKind::LowPass => {
                let b = (1.0 - cos_w0) * 0.5;
                (b, 1.0 - cos_w0, b)
            }
            FilterKind::HighPass => {
                let b = (1.0 + cos_w0) * 0.5;
                (b, -(1.0 + cos_w0), b)
            }
        };

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = (-2.0 * cos_w0) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    fn tick(&self, s: &mut BiquadState, x: f32) -> f32 {
        let y = self.b0 * x + s.z1;
        s.z1 = self.b1 * x - self.a1 * y + s.z2;
        s.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

impl Effect for Biquad {
    fn process(&mut self, buf: &mut [StereoFrame]) {
        if !self.settings.enabled {
            return; // bypassed, filtered voices pass through dry
        }
        let mut left = self.left;
        let mut right = self.right;
        for f in buf.iter_mut() {
            f.left = self.tick(&mut left, f.left);
            f.right = self.tick(&mut right, f.right);
        }
        self.left = left;
        self.right = right;
    }
}
