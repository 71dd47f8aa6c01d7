// Purely for testing: a voice player that records what it was asked to play,
// and transports with samples already attached.

use crate::audio::SampleId;
use crate::audio_api::VoicePlayer;
use crate::error::PlayError;
use crate::shared::DEFAULT_STEPS;

use super::transport::{Transport, VoiceSlot};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Play {
    pub sample: SampleId,
    pub start_time: f64,
    pub gain: f32,
    pub filtered: bool,
}

#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub plays: Vec<Play>,
    pub reject: Option<SampleId>, // refuse this sample, like a full queue would
}

impl VoicePlayer for RecordingPlayer {
    fn play(
        &mut self,
        sample: SampleId,
        start_time: f64,
        gain: f32,
        use_shared_filter: bool,
    ) -> Result<(), PlayError> {
        if self.reject == Some(sample) {
            return Err(PlayError::QueueFull);
        }
        self.plays.push(Play { sample, start_time, gain, filtered: use_shared_filter });
        Ok(())
    }
}

// voice i plays SampleId(i)
pub fn transport_with_samples(voices: usize, tempo: f32) -> Transport {
    let ids: Vec<Option<u64>> = (0..voices as u64).map(Some).collect();
    transport_with_voices(&ids, tempo)
}

pub fn transport_with_voices(samples: &[Option<u64>], tempo: f32) -> Transport {
    let voices = samples
        .iter()
        .enumerate()
        .map(|(i, id)| VoiceSlot {
            sample: id.map(SampleId),
            ..VoiceSlot::new(format!("voice-{i}"))
        })
        .collect();
    Transport::new(voices, DEFAULT_STEPS, tempo)
}
