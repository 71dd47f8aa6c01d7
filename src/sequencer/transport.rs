use crate::audio::SampleId;
use crate::error::SeqError;
use crate::loader::KitDescriptor;
use crate::shared::{DEFAULT_GAIN, MAX_GAIN, MAX_TEMPO, MIN_TEMPO, STEPS_PER_BEAT};

use super::pattern::Pattern;

/// One instrument row: the sample it plays and how it is mixed.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSlot {
    pub name: String,
    pub sample: Option<SampleId>, // None until decoded, or for good if decoding failed
    pub gain: f32,
    pub filtered: bool,
}

impl VoiceSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sample: None,
            gain: DEFAULT_GAIN,
            filtered: false,
        }
    }
}

/// Play/stop state, tempo, the pattern and the voices, plus the time the
/// upcoming step is due.
///
/// Times held here are seconds on the transport's own time base: `start`
/// anchors that base at the audio clock's current reading so every run
/// begins at zero, and `to_clock_time` maps back to the audio clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Transport {
    pattern: Pattern,
    voices: Vec<VoiceSlot>,
    tempo: f32,
    default_tempo: f32,
    current_step: usize,
    next_step_time: f64,
    playing: bool,
    time_base: Option<f64>,
}

impl Transport {
    pub fn new(voices: Vec<VoiceSlot>, steps: usize, default_tempo: f32) -> Self {
        let default_tempo = clamp_tempo(default_tempo).unwrap_or(MIN_TEMPO);
        Self {
            pattern: Pattern::new(voices.len(), steps.max(1)),
            voices,
            tempo: default_tempo,
            default_tempo,
            current_step: 0,
            next_step_time: 0.0,
            playing: false,
            time_base: None,
        }
    }

    pub fn for_kit(kit: &KitDescriptor, steps: usize) -> Self {
        let voices = kit.sample_names.iter().map(VoiceSlot::new).collect();
        Self::new(voices, steps, kit.default_tempo)
    }

    // -- playback --

    pub fn start(&mut self, clock_now: f64) {
        self.time_base = Some(clock_now);
        self.current_step = 0;
        self.next_step_time = 0.0;
        self.playing = true;
    }

    // Dropping the time base means the next start counts from zero again.
    // The audio clock itself is never touched.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time_base = None;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.pattern.clear();
        self.tempo = self.default_tempo;
    }

    /// Move to the next step: the due time grows by one sixteenth at the
    /// tempo in force right now.
    pub fn advance_step(&mut self) {
        self.next_step_time += self.step_interval();
        self.current_step = (self.current_step + 1) % self.pattern.steps();
    }

    pub fn step_interval(&self) -> f64 {
        60.0 / self.tempo as f64 / STEPS_PER_BEAT
    }

    /// Transport time for a raw audio clock reading (zero while stopped).
    pub fn now_from(&self, clock_now: f64) -> f64 {
        match self.time_base {
            Some(base) => clock_now - base,
            None => 0.0,
        }
    }

    /// Audio clock time of a transport time.
    pub fn to_clock_time(&self, time: f64) -> f64 {
        self.time_base.unwrap_or(0.0) + time
    }

    // -- edits --

    /// Non-finite tempos are refused; anything else is clamped into the
    /// playable range so the scheduling loop always terminates.
    pub fn set_tempo(&mut self, bpm: f32) -> Result<f32, SeqError> {
        self.tempo = clamp_tempo(bpm)?;
        Ok(self.tempo)
    }

    pub fn toggle_cell(&mut self, voice: usize, step: usize) -> Result<bool, SeqError> {
        self.pattern.toggle(voice, step)
    }

    pub fn set_gain(&mut self, voice: usize, gain: f32) -> Result<f32, SeqError> {
        let slot = self.voice_mut(voice)?;
        if gain.is_finite() {
            slot.gain = gain.clamp(0.0, MAX_GAIN);
        }
        Ok(slot.gain)
    }

    pub fn set_voice_filtered(&mut self, voice: usize, filtered: bool) -> Result<(), SeqError> {
        self.voice_mut(voice)?.filtered = filtered;
        Ok(())
    }

    pub fn attach_sample(&mut self, voice: usize, sample: SampleId) -> Result<(), SeqError> {
        self.voice_mut(voice)?.sample = Some(sample);
        Ok(())
    }

    fn voice_mut(&mut self, voice: usize) -> Result<&mut VoiceSlot, SeqError> {
        let count = self.voices.len();
        self.voices
            .get_mut(voice)
            .ok_or(SeqError::VoiceOutOfRange { voice, count })
    }

    // -- reads --

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    pub fn default_tempo(&self) -> f32 {
        self.default_tempo
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn next_step_time(&self) -> f64 {
        self.next_step_time
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn voices(&self) -> &[VoiceSlot] {
        &self.voices
    }

    pub fn voice(&self, voice: usize) -> Option<&VoiceSlot> {
        self.voices.get(voice)
    }

    pub fn steps(&self) -> usize {
        self.pattern.steps()
    }
}

fn clamp_tempo(bpm: f32) -> Result<f32, SeqError> {
    if !bpm.is_finite() {
        return Err(SeqError::InvalidTempo(bpm));
    }
    Ok(bpm.clamp(MIN_TEMPO, MAX_TEMPO))
}
