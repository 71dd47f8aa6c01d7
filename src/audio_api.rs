pub use crate::audio::{FilterSettings, SampleBuffer, SampleId};
use crate::error::PlayError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerParams {
    pub sample_id: SampleId,
    pub start_frame: u64, // absolute output frame the voice must start on
    pub gain: f32,
    pub filtered: bool,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't touch the disk from the audio callback, so buffers are
    // decoded on the main thread and registered here before any trigger
    // refers to them.
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // Start a registered sample on an exact frame, possibly far in the future.
    Trigger(TriggerParams),

    // Retune the shared filter bus.
    SetFilter(FilterSettings),
}

/// What the look-ahead scheduler talks to: something that can start a
/// sample at an absolute audio-clock time.
pub trait VoicePlayer {
    fn play(
        &mut self,
        sample: SampleId,
        start_time: f64,
        gain: f32,
        use_shared_filter: bool,
    ) -> Result<(), PlayError>;
}
