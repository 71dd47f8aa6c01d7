// Types shared by the middle layer and the TUI.
//
// The TUI never touches the transport or the scheduler directly: it turns
// key presses into `InputEvent`s for the middle layer, and every frame it
// renders whatever `DisplayState` the middle layer hands back.
//
// Keys (see tui/input.rs):
//   1 .. 9        //  ToggleCell(selected voice, page * 9 + key - 1)
//   left / right  //  previous / next page of nine steps (tui only)
//   up / down     //  SelectVoice(-1 / +1)
//   Space         //  PlayStop
//   Backspace     //  Reset
//   - / =         //  TempoNudge(-1 / +1)
//   t             //  TempoChange(kit default)
//   [ / ]         //  GainNudge(selected voice, -0.05 / +0.05)
//   g             //  GainChange(selected voice, unity)
//   l / h         //  FilterToggle(LowPass / HighPass)
//   , / .         //  FilterParamNudge(Cutoff, ...)
//   ; / '         //  FilterParamNudge(Resonance, ...)
//   c / q         //  FilterParamChange(Cutoff / Resonance, default)
//   f             //  ToggleVoiceFilter(selected voice)
//   Esc           //  Quit

use serde::{Deserialize, Serialize};

use crate::audio::FilterKind;

pub const DEFAULT_STEPS: usize = 4;
pub const STEPS_PER_BEAT: f64 = 4.0; // sixteenth notes against a quarter-note tempo
pub const MIN_TEMPO: f32 = 20.0;
pub const MAX_TEMPO: f32 = 300.0;
pub const DEFAULT_GAIN: f32 = 1.0;
pub const MAX_GAIN: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Cutoff,
    Resonance,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // grid edits
    ToggleCell { voice: usize, step: usize },
    SelectVoice(i32), // relative move of the selected row

    // transport
    PlayStop,
    Reset,
    TempoChange(f32), // absolute bpm
    TempoNudge(f32),  // relative bpm

    // per-voice mix
    GainChange { voice: usize, gain: f32 },
    GainNudge { voice: usize, delta: f32 },
    ToggleVoiceFilter(usize),

    // shared filter
    FilterToggle(FilterKind),
    FilterParamChange { param: FilterParam, value: f32 },
    FilterParamNudge { param: FilterParam, delta: f32 },

    Quit,
}

/// How the playing cursor is drawn on the pad grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPolicy {
    /// light the cursor column on every voice row
    #[default]
    AllRows,
    /// light the cursor only where the cell is armed
    ActiveOnly,
}

/// Highlight of a single pad, composed by the animation consumer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PadHighlight {
    #[default]
    Off,
    Playing,
}

#[derive(Clone, Debug)]
pub struct VoiceRow {
    pub name: String,
    pub cells: Vec<bool>, // "selected" pads
    pub highlight: Vec<PadHighlight>,
    pub gain: f32,
    pub filtered: bool,
    pub loaded: bool,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub kit_name: String,
    pub rows: Vec<VoiceRow>,
    pub selected_voice: usize,
    pub playing: bool,
    pub displayed_step: Option<usize>, // step that is audible right now
    pub tempo: f32,
    pub default_tempo: f32, // what reset and the tempo key go back to
    pub filter_text: String,
    pub status_text: String,
}
