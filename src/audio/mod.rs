use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, TriggerParams, VoicePlayer};
use crate::error::PlayError;

mod clock;
mod effect;
mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use clock::{AudioClock, StreamClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use effect::{FilterKind, FilterSettings, DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE};
pub use frame::StereoFrame;
pub use sample_buffer::{next_sample_id, SampleBuffer, SampleId};

use engine::Engine;

const COMMAND_CAPACITY: usize = 1024;

/// Main-thread side of the output stream: the command sender plus the clock
/// the stream drives.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: StreamClock,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if let Err(e) = self.tx.try_send(cmd) {
            log::warn!("dropped audio command: {e}");
        }
    }

    pub fn clock(&self) -> &StreamClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }
}

impl VoicePlayer for AudioHandle {
    fn play(
        &mut self,
        sample: SampleId,
        start_time: f64,
        gain: f32,
        use_shared_filter: bool,
    ) -> Result<(), PlayError> {
        let cmd = AudioCommand::Trigger(TriggerParams {
            sample_id: sample,
            start_frame: self.clock.frame_at(start_time),
            gain,
            filtered: use_shared_filter,
        });
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => PlayError::QueueFull,
            TrySendError::Disconnected(_) => PlayError::Disconnected,
        })
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_CAPACITY);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate() as u32;
    let channels = config.channels() as usize;
    log::info!("audio output: {sample_rate} Hz, {channels} channel(s)");

    let frames_rendered = Arc::new(AtomicU64::new(0));

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                sample_rate,
                channels,
                frames_rendered.clone(),
            )?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                clock: StreamClock::new(frames_rendered, sample_rate),
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    sample_rate: u32,
    channels: usize,
    frames_rendered: Arc<AtomicU64>,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate, frames_rendered);
    let mut block: Vec<StereoFrame> = vec![StereoFrame::zero(); 4096];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if block.len() < n_frames {
                block.resize(n_frames, StereoFrame::zero());
            }
            let frames = &mut block[..n_frames];
            engine.render_block(frames);

            // spread the stereo mix over however many channels the device has
            for (out, f) in data.chunks_exact_mut(channels.max(1)).zip(frames.iter()) {
                match out.len() {
                    1 => out[0] = 0.5 * (f.left + f.right),
                    _ => {
                        out[0] = f.left;
                        out[1] = f.right;
                        out[2..].iter_mut().for_each(|s| *s = 0.0);
                    }
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
