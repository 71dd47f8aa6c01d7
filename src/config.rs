// Runtime knobs for the scheduler and the display loop. Everything has a
// default, so a settings file only needs the fields it changes.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::SeqError;
use crate::shared::{RenderPolicy, DEFAULT_STEPS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// how often the scheduler wakes up
    pub lookahead_ms: u64,
    /// how far past the audio clock each wake-up commits steps
    pub schedule_ahead_secs: f64,
    /// display refresh cadence (~60fps)
    pub frame_interval_ms: u64,
    pub steps: usize,
    pub render_policy: RenderPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookahead_ms: 25,
            schedule_ahead_secs: 0.1,
            frame_interval_ms: 16,
            steps: DEFAULT_STEPS,
            render_policy: RenderPolicy::AllRows,
        }
    }
}

impl Settings {
    pub fn lookahead(&self) -> Duration {
        Duration::from_millis(self.lookahead_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SeqError> {
        if self.lookahead_ms == 0 || self.frame_interval_ms == 0 {
            return Err(SeqError::InvalidSettings("intervals must be non-zero".into()));
        }
        if self.steps == 0 {
            return Err(SeqError::InvalidSettings("a pattern needs at least one step".into()));
        }
        if !self.schedule_ahead_secs.is_finite() || self.schedule_ahead_secs <= 0.0 {
            return Err(SeqError::InvalidSettings("schedule ahead must be positive".into()));
        }
        // the horizon has to cover a late wake-up or steps get committed late
        if self.schedule_ahead_secs <= self.lookahead().as_secs_f64() {
            return Err(SeqError::InvalidSettings(format!(
                "schedule ahead ({}s) must exceed the lookahead interval ({}ms)",
                self.schedule_ahead_secs, self.lookahead_ms
            )));
        }
        Ok(())
    }
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.lookahead(), Duration::from_millis(25));
        assert_eq!(s.steps, 4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "steps": 8, "render_policy": "active_only" }"#).unwrap();
        assert_eq!(s.steps, 8);
        assert_eq!(s.render_policy, RenderPolicy::ActiveOnly);
        assert_eq!(s.lookahead_ms, 25);
    }

    #[test]
    fn horizon_must_cover_timer_interval() {
        let s = Settings { lookahead_ms: 200, ..Default::default() };
        assert!(matches!(s.validate(), Err(SeqError::InvalidSettings(_))));

        let s = Settings { steps: 0, ..Default::default() };
        assert!(s.validate().is_err());

        let s = Settings { schedule_ahead_secs: f64::NAN, ..Default::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn load_settings_from_file() {
        let path = std::env::temp_dir().join(format!("beatseq-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "lookahead_ms": 20, "schedule_ahead_secs": 0.05 }"#).unwrap();
        let s = load_settings(&path).unwrap();
        assert_eq!(s.lookahead_ms, 20);
        assert_eq!(s.schedule_ahead_secs, 0.05);
        let _ = std::fs::remove_file(path);
    }
}
