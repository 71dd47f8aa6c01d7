use std::path::Path;

use crate::audio::{next_sample_id, SampleBuffer, SampleId};

use super::kit::KitDescriptor;

// Load a WAV from disk, ready to be registered with the engine
pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<(SampleId, SampleBuffer)> {
    let buffer = SampleBuffer::load_wav(path, target_rate)?;
    if buffer.is_empty() {
        anyhow::bail!("{} has no audio frames", path.display());
    }
    Ok((next_sample_id(), buffer))
}

/// Decode every sample a kit names, one entry per voice row. A sample that
/// can't be read leaves its row as `None`; that voice just stays silent.
pub fn load_kit_samples(kit: &KitDescriptor, target_rate: u32) -> Vec<Option<(SampleId, SampleBuffer)>> {
    (0..kit.voice_count())
        .map(|voice| {
            let path = kit.sample_path(voice)?;
            match load(&path, target_rate) {
                Ok(loaded) => {
                    log::debug!("loaded {} ({} frames)", path.display(), loaded.1.len());
                    Some(loaded)
                }
                Err(e) => {
                    log::warn!("voice {voice}: {e:#}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_samples_become_empty_rows() {
        let dir = std::env::temp_dir().join(format!("beatseq-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(dir.join("kick.wav"), spec).unwrap();
        for _ in 0..10 {
            w.write_sample(1000i16).unwrap();
        }
        w.finalize().unwrap();
        // a header with no frames is as good as missing
        hound::WavWriter::create(dir.join("hat.wav"), spec).unwrap().finalize().unwrap();

        let kit = KitDescriptor {
            name: "t".into(),
            path_prefix: format!("{}/", dir.display()),
            sample_names: vec!["kick".into(), "snare".into(), "hat".into()],
            default_tempo: 120.0,
        };
        let loaded = load_kit_samples(&kit, 44_100);
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].as_ref().map(|(_, b)| b.len()), Some(10));
        assert!(loaded[1].is_none());
        assert!(loaded[2].is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
