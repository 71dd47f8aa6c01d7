// Kit descriptors: which samples fill the voice rows, and the tempo a kit
// starts at. Read once at startup, never mutated.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::SeqError;

pub const DEFAULT_KIT: &str = "hip-hop";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KitDescriptor {
    #[serde(default)]
    pub name: String,
    pub path_prefix: String,
    pub sample_names: Vec<String>,
    pub default_tempo: f32,
}

// name, directory, samples, tempo
const BUILTIN_KITS: &[(&str, &str, &[&str], f32)] = &[
    (
        "rock",
        "kits/rock/",
        &["KICK-1", "KICK-2", "SNARE-1", "HHAT-1", "HHAT-2", "TOM-1", "TOM-2", "RIDE", "CRASH", "TAMBORINE", "SHAKER"],
        100.0,
    ),
    (
        "hip-hop",
        "kits/hip-hop/",
        &["KICK-1", "KICK-2", "SNARE-1", "HHAT-1", "HHAT-2", "CLAP-1", "PERC-1", "PERC-2", "PERC-3", "CYMBAL-1", "VOCAL-1"],
        90.0,
    ),
    (
        "house",
        "kits/house/",
        &["KICK-1", "SNARE-1", "CLAP-1", "CLAP-2", "HHAT-1", "HHAT-2", "PERC-1", "PERC-2", "CYMBAL-1", "STAB-1", "TOM-1"],
        125.0,
    ),
    (
        "techno",
        "kits/techno/",
        &["KICK-1", "KICK-2", "SNARE-1", "SNARE-2", "HHAT-1", "PERC-1", "PERC-2", "PERC-3", "PERC-4", "FX-1"],
        130.0,
    ),
    (
        "dnb",
        "kits/dnb/",
        &["KICK-1", "SNARE-1", "SNARE-2", "HHAT-1", "HHAT-2", "PERC-1", "BASS-1", "BASS-2", "BASS-3", "FX-1", "FX-2"],
        170.0,
    ),
];

impl KitDescriptor {
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_KITS.iter().map(|(name, ..)| *name)
    }

    pub fn builtin(name: &str) -> Option<Self> {
        BUILTIN_KITS
            .iter()
            .find(|(n, ..)| n.eq_ignore_ascii_case(name))
            .map(|(n, prefix, samples, tempo)| Self {
                name: n.to_string(),
                path_prefix: prefix.to_string(),
                sample_names: samples.iter().map(|s| s.to_string()).collect(),
                default_tempo: *tempo,
            })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SeqError> {
        let kit: Self = serde_json::from_str(json).map_err(|e| SeqError::InvalidKit(e.to_string()))?;
        kit.validate()?;
        Ok(kit)
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading kit {}", path.display()))?;
        let mut kit = Self::from_json_str(&data)?;
        if kit.name.is_empty() {
            kit.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(kit)
    }

    // a built-in name wins, otherwise the argument is a path to a kit file
    pub fn resolve(arg: &str) -> anyhow::Result<Self> {
        if let Some(kit) = Self::builtin(arg) {
            return Ok(kit);
        }
        let path = Path::new(arg);
        if path.is_file() {
            return Self::from_json_file(path);
        }
        let known: Vec<&str> = Self::builtin_names().collect();
        Err(anyhow::Error::from(SeqError::UnknownKit(arg.to_string()))
            .context(format!("built-in kits: {}", known.join(", "))))
    }

    pub fn validate(&self) -> Result<(), SeqError> {
        if self.sample_names.is_empty() {
            return Err(SeqError::InvalidKit("kit has no samples".into()));
        }
        if !self.default_tempo.is_finite() || self.default_tempo <= 0.0 {
            return Err(SeqError::InvalidKit(format!(
                "default tempo must be positive, got {}",
                self.default_tempo
            )));
        }
        Ok(())
    }

    pub fn voice_count(&self) -> usize {
        self.sample_names.len()
    }

    /// `path_prefix + name`, with `.wav` appended when the name has no extension.
    pub fn sample_path(&self, voice: usize) -> Option<PathBuf> {
        let name = self.sample_names.get(voice)?;
        let mut path = format!("{}{}", self.path_prefix, name);
        if Path::new(name).extension().is_none() {
            path.push_str(".wav");
        }
        Some(PathBuf::from(path))
    }
}
