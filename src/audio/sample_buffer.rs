use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use super::frame::StereoFrame;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a decoded buffer registered with the audio engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

// atomic so ids stay unique whichever thread does the loading
pub fn next_sample_id() -> SampleId {
    SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A decoded, randomly accessible sample at the output device rate.
#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode a WAV file into stereo frames at `target_rate`.
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let samples = read_samples(reader)?;
        let frames = interleaved_to_frames(&samples, spec.channels);
        let data = if spec.sample_rate != target_rate {
            resample_linear(&frames, spec.sample_rate, target_rate)
        } else {
            frames
        };
        Ok(Self { data })
    }
}

fn read_samples<R: std::io::Read>(mut reader: hound::WavReader<R>) -> anyhow::Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            // full scale of a signed integer with this many bits
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / full_scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

// mono is duplicated to both sides, anything wider keeps its first two channels
fn interleaved_to_frames(samples: &[f32], channels: u16) -> Vec<StereoFrame> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&x| StereoFrame::mono(x)).collect(),
        n => samples
            .chunks_exact(n as usize)
            .map(|c| StereoFrame { left: c[0], right: c[1] })
            .collect(),
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let step = source_rate as f64 / target_rate as f64; // source frames per output frame
    let out_len = (frames.len() as f64 / step).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let t = (pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left + (b.left - a.left) * t,
                right: a.right + (b.right - a.right) * t,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(name: &str, spec: hound::WavSpec, samples: &[i16]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("beatseq-{}-{}.wav", name, std::process::id()));
        let mut w = hound::WavWriter::create(&path, spec).unwrap();
        for &s in samples {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
        path
    }

    #[test]
    fn sample_ids_are_unique() {
        let a = next_sample_id();
        let b = next_sample_id();
        assert_ne!(a, b);
    }

    #[test]
    fn mono_wav_is_duplicated_to_stereo() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = write_wav("mono", spec, &[0, 16_384, -16_384]);
        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.data[1].left, 0.5);
        assert_eq!(buf.data[1].right, 0.5);
        assert_eq!(buf.data[2].left, -0.5);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn stereo_wav_keeps_channels_apart() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let path = write_wav("stereo", spec, &[16_384, 0, 0, -16_384]);
        let buf = SampleBuffer::load_wav(&path, 48_000).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.data[0], StereoFrame { left: 0.5, right: 0.0 });
        assert_eq!(buf.data[1], StereoFrame { left: 0.0, right: -0.5 });
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("beatseq-definitely-missing.wav");
        assert!(SampleBuffer::load_wav(&missing, 44_100).is_err());
    }

    #[test]
    fn upsampling_doubles_length_and_interpolates() {
        let frames = vec![StereoFrame::mono(0.0), StereoFrame::mono(1.0)];
        let out = resample_linear(&frames, 22_050, 44_100);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].left, 0.0);
        assert_eq!(out[1].left, 0.5);
        assert_eq!(out[2].left, 1.0);
    }
}
