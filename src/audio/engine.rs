use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio_api::{AudioCommand, TriggerParams};

use super::effect::{Biquad, Effect, FilterSettings};
use super::frame::{silence, StereoFrame};
use super::sample_buffer::{SampleBuffer, SampleId};
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so the callback never grows the pool
const MAX_PENDING: usize = 256;
const MAX_SAMPLES: usize = 256; // registry is reserved up front, never rehashed here
const SCRATCH_FRAMES: usize = 4096;

/// Lives on the audio thread. Starts triggers on their exact frame and
/// publishes how many frames it has rendered, which is the audio clock.
pub struct Engine {
    samples: HashMap<SampleId, SampleBuffer>,
    pending: Vec<TriggerParams>, // sorted by start_frame
    voices: [Voice; MAX_VOICES],
    filter: Biquad,
    dry: Vec<StereoFrame>,
    wet: Vec<StereoFrame>,
    frame_pos: u64,
    frames_rendered: Arc<AtomicU64>,
}

impl Engine {
    pub fn new(sample_rate: u32, frames_rendered: Arc<AtomicU64>) -> Self {
        Self {
            samples: HashMap::with_capacity(MAX_SAMPLES),
            pending: Vec::with_capacity(MAX_PENDING),
            voices: [Voice::idle(); MAX_VOICES],
            filter: Biquad::new(sample_rate as f32, FilterSettings::default()),
            dry: vec![StereoFrame::zero(); SCRATCH_FRAMES],
            wet: vec![StereoFrame::zero(); SCRATCH_FRAMES],
            frame_pos: frames_rendered.load(Ordering::Acquire),
            frames_rendered,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                // a new id past the reserved capacity would make the map grow
                // on the audio thread, so it is refused
                if self.samples.len() < MAX_SAMPLES || self.samples.contains_key(&id) {
                    self.samples.insert(id, buffer);
                }
            }
            AudioCommand::Trigger(t) => self.schedule(t),
            AudioCommand::SetFilter(settings) => self.filter.set(settings),
        }
    }

    fn schedule(&mut self, t: TriggerParams) {
        if !self.samples.contains_key(&t.sample_id) {
            return; // never registered (load failed): silent
        }
        if self.pending.len() >= MAX_PENDING {
            return;
        }
        // keep sorted so the earliest trigger is always at the front
        let at = self.pending.partition_point(|p| p.start_frame <= t.start_frame);
        self.pending.insert(at, t);
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        let n = out.len();
        if self.dry.len() < n {
            self.dry.resize(n, StereoFrame::zero());
            self.wet.resize(n, StereoFrame::zero());
        }
        silence(&mut self.dry[..n]);
        silence(&mut self.wet[..n]);

        let block_start = self.frame_pos;
        let block_end = block_start + n as u64;

        // voices already sounding cover the whole block
        for v in self.voices.iter_mut().filter(|v| v.active) {
            if let Some(buf) = self.samples.get(&v.sample_id) {
                let bus = if v.filtered { &mut self.wet } else { &mut self.dry };
                v.render_into(buf, &mut bus[..n]);
            } else {
                v.active = false;
            }
        }

        // triggers due inside this block start on their own frame; late ones
        // start at the top of the block
        let due = self.pending.partition_point(|p| p.start_frame < block_end);
        for i in 0..due {
            let t = self.pending[i];
            let Some(buf) = self.samples.get(&t.sample_id) else {
                continue;
            };
            let offset = t.start_frame.saturating_sub(block_start) as usize;
            let slot = free_or_oldest(&self.voices);
            let mut voice = Voice::new(t.sample_id, t.gain, t.filtered, t.start_frame);
            let bus = if t.filtered { &mut self.wet } else { &mut self.dry };
            voice.render_into(buf, &mut bus[offset..n]);
            self.voices[slot] = voice;
        }
        self.pending.drain(..due);

        self.filter.process(&mut self.wet[..n]);
        for ((o, d), w) in out.iter_mut().zip(&self.dry[..n]).zip(&self.wet[..n]) {
            o.left = d.left + w.left;
            o.right = d.right + w.right;
        }

        self.frame_pos = block_end;
        self.frames_rendered.store(block_end, Ordering::Release);
    }
}

fn free_or_oldest(voices: &[Voice]) -> usize {
    if let Some(i) = voices.iter().position(|v| !v.active) {
        return i;
    }
    voices
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| v.started_at())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_click(len: usize) -> (Engine, SampleId, Arc<AtomicU64>) {
        let frames = Arc::new(AtomicU64::new(0));
        let mut engine = Engine::new(44_100, frames.clone());
        let id = SampleId(9_000);
        engine.handle_cmd(AudioCommand::RegisterSample {
            id,
            buffer: SampleBuffer { data: vec![StereoFrame::mono(1.0); len] },
        });
        (engine, id, frames)
    }

    fn trigger(id: SampleId, start_frame: u64, gain: f32) -> AudioCommand {
        AudioCommand::Trigger(TriggerParams { sample_id: id, start_frame, gain, filtered: false })
    }

    #[test]
    fn trigger_starts_on_exact_frame() {
        let (mut engine, id, frames) = engine_with_click(4);
        engine.handle_cmd(trigger(id, 10, 0.5));

        let mut out = vec![StereoFrame::zero(); 32];
        engine.render_block(&mut out);

        assert_eq!(out[9].left, 0.0);
        assert_eq!(out[10].left, 0.5);
        assert_eq!(out[13].left, 0.5);
        assert_eq!(out[14].left, 0.0);
        assert_eq!(frames.load(Ordering::Acquire), 32);
    }

    #[test]
    fn future_trigger_waits_for_its_block() {
        let (mut engine, id, _) = engine_with_click(100);
        engine.handle_cmd(trigger(id, 40, 1.0));

        let mut out = vec![StereoFrame::zero(); 32];
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| f.left == 0.0));
        assert_eq!(engine.pending_len(), 1);

        engine.render_block(&mut out);
        assert_eq!(out[7].left, 0.0);
        assert_eq!(out[8].left, 1.0);
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(engine.active_voices(), 1);
    }

    #[test]
    fn late_trigger_starts_at_block_top() {
        let (mut engine, id, _) = engine_with_click(100);
        let mut out = vec![StereoFrame::zero(); 16];
        engine.render_block(&mut out);

        engine.handle_cmd(trigger(id, 3, 1.0));
        engine.render_block(&mut out);
        assert_eq!(out[0].left, 1.0);
    }

    #[test]
    fn sample_registry_never_grows_past_its_reservation() {
        let frames = Arc::new(AtomicU64::new(0));
        let mut engine = Engine::new(44_100, frames);
        let reserved = engine.samples.capacity();
        assert!(reserved >= MAX_SAMPLES);

        for i in 0..MAX_SAMPLES as u64 {
            engine.handle_cmd(AudioCommand::RegisterSample { id: SampleId(i), buffer: SampleBuffer::default() });
        }
        let extra = SampleId(MAX_SAMPLES as u64);
        engine.handle_cmd(AudioCommand::RegisterSample { id: extra, buffer: SampleBuffer::default() });
        assert_eq!(engine.samples.len(), MAX_SAMPLES);
        assert_eq!(engine.samples.capacity(), reserved);

        // refused, so its triggers are dropped like any unknown sample
        engine.handle_cmd(trigger(extra, 0, 1.0));
        assert_eq!(engine.pending_len(), 0);

        // re-registering a known id still replaces it
        engine.handle_cmd(AudioCommand::RegisterSample {
            id: SampleId(0),
            buffer: SampleBuffer { data: vec![StereoFrame::mono(1.0); 2] },
        });
        assert_eq!(engine.samples[&SampleId(0)].len(), 2);
    }

    #[test]
    fn unknown_sample_is_dropped() {
        let (mut engine, _, _) = engine_with_click(4);
        engine.handle_cmd(trigger(SampleId(424_242), 0, 1.0));
        assert_eq!(engine.pending_len(), 0);
    }

    #[test]
    fn pending_triggers_stay_sorted() {
        let (mut engine, id, _) = engine_with_click(1);
        engine.handle_cmd(trigger(id, 20, 1.0));
        engine.handle_cmd(trigger(id, 5, 0.25));

        let mut out = vec![StereoFrame::zero(); 32];
        engine.render_block(&mut out);
        assert_eq!(out[5].left, 0.25);
        assert_eq!(out[20].left, 1.0);
    }

    #[test]
    fn filtered_voice_passes_dry_when_filter_off() {
        let (mut engine, id, _) = engine_with_click(4);
        engine.handle_cmd(AudioCommand::Trigger(TriggerParams {
            sample_id: id,
            start_frame: 0,
            gain: 1.0,
            filtered: true,
        }));
        let mut out = vec![StereoFrame::zero(); 8];
        engine.render_block(&mut out);
        assert_eq!(out[0].left, 1.0);
    }

    #[test]
    fn full_pool_steals_oldest_voice() {
        let (mut engine, id, _) = engine_with_click(10_000);
        for i in 0..(MAX_VOICES as u64 + 1) {
            engine.handle_cmd(trigger(id, i, 1.0));
        }
        let mut out = vec![StereoFrame::zero(); 64];
        engine.render_block(&mut out);
        assert_eq!(engine.active_voices(), MAX_VOICES);
    }
}
