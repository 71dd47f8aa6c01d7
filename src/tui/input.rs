use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::audio::{FilterKind, DEFAULT_CUTOFF_HZ, DEFAULT_RESONANCE};
use crate::shared::{FilterParam, InputEvent, DEFAULT_GAIN};
use super::mode::{TuiState, STEPS_PER_PAGE};

const TEMPO_STEP: f32 = 1.0;
const GAIN_STEP: f32 = 0.05;
const CUTOFF_STEP: f32 = 1.0 / 6.0; // octaves, so six presses double it
const RESONANCE_STEP: f32 = 0.1;

// poll for input from tui and resolve key presses into input events for
// the middle layer. returns nothing if no key arrived within `timeout`
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let voice = ts.selected_voice;
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayStop],
        KeyCode::Backspace => vec![InputEvent::Reset],

        // step keys toggle a cell of the current page on the selected row
        KeyCode::Char(c @ '1'..='9') => match char_to_step(c) {
            Some(offset) => {
                let step = ts.page * STEPS_PER_PAGE + offset;
                if step < ts.steps {
                    vec![InputEvent::ToggleCell { voice, step }]
                } else {
                    vec![]
                }
            }
            None => vec![],
        },
        KeyCode::Left => { ts.page_step(-1); vec![] }
        KeyCode::Right => { ts.page_step(1); vec![] }
        KeyCode::Up => vec![InputEvent::SelectVoice(-1)],
        KeyCode::Down => vec![InputEvent::SelectVoice(1)],

        KeyCode::Char('-') => vec![InputEvent::TempoNudge(-TEMPO_STEP)],
        KeyCode::Char('=') => vec![InputEvent::TempoNudge(TEMPO_STEP)],
        KeyCode::Char('t') => vec![InputEvent::TempoChange(ts.default_tempo)],
        KeyCode::Char('[') => vec![InputEvent::GainNudge { voice, delta: -GAIN_STEP }],
        KeyCode::Char(']') => vec![InputEvent::GainNudge { voice, delta: GAIN_STEP }],
        KeyCode::Char('g') => vec![InputEvent::GainChange { voice, gain: DEFAULT_GAIN }],
        KeyCode::Char('f') => vec![InputEvent::ToggleVoiceFilter(voice)],

        // shared filter
        KeyCode::Char('l') => vec![InputEvent::FilterToggle(FilterKind::LowPass)],
        KeyCode::Char('h') => vec![InputEvent::FilterToggle(FilterKind::HighPass)],
        KeyCode::Char(',') => vec![InputEvent::FilterParamNudge { param: FilterParam::Cutoff, delta: -CUTOFF_STEP }],
        KeyCode::Char('.') => vec![InputEvent::FilterParamNudge { param: FilterParam::Cutoff, delta: CUTOFF_STEP }],
        KeyCode::Char(';') => vec![InputEvent::FilterParamNudge { param: FilterParam::Resonance, delta: -RESONANCE_STEP }],
        KeyCode::Char('\'') => vec![InputEvent::FilterParamNudge { param: FilterParam::Resonance, delta: RESONANCE_STEP }],
        KeyCode::Char('c') => vec![InputEvent::FilterParamChange { param: FilterParam::Cutoff, value: DEFAULT_CUTOFF_HZ }],
        KeyCode::Char('q') => vec![InputEvent::FilterParamChange { param: FilterParam::Resonance, value: DEFAULT_RESONANCE }],

        _ => vec![],
    }
}

// '1' is the first step
fn char_to_step(c: char) -> Option<usize> {
    c.to_digit(10).filter(|d| *d > 0).map(|d| d as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn state(steps: usize, selected_voice: usize) -> TuiState {
        TuiState { selected_voice, steps, default_tempo: 90.0, page: 0 }
    }

    fn toggled_step(events: &[InputEvent]) -> Option<usize> {
        match events {
            [InputEvent::ToggleCell { step, .. }] => Some(*step),
            _ => None,
        }
    }

    #[test]
    fn step_keys_target_the_selected_voice() {
        let mut ts = state(4, 2);
        assert_eq!(handle_key(KeyCode::Char('1'), &mut ts), vec![InputEvent::ToggleCell { voice: 2, step: 0 }]);
        assert_eq!(handle_key(KeyCode::Char('4'), &mut ts), vec![InputEvent::ToggleCell { voice: 2, step: 3 }]);
    }

    #[test]
    fn step_keys_past_the_pattern_are_ignored() {
        let mut ts = state(4, 0);
        assert!(handle_key(KeyCode::Char('5'), &mut ts).is_empty());
        assert!(handle_key(KeyCode::Char('0'), &mut ts).is_empty());
        // a short pattern has one page
        handle_key(KeyCode::Right, &mut ts);
        assert_eq!(ts.page, 0);
    }

    #[test]
    fn every_step_of_a_long_pattern_is_reachable() {
        let mut ts = state(16, 0);
        let mut reached = BTreeSet::new();
        for _ in 0..3 {
            for c in '1'..='9' {
                reached.extend(toggled_step(&handle_key(KeyCode::Char(c), &mut ts)));
            }
            handle_key(KeyCode::Right, &mut ts);
        }
        assert_eq!(reached, (0..16).collect::<BTreeSet<_>>());
        assert_eq!(ts.page, 1); // clamped to the last page

        assert_eq!(toggled_step(&handle_key(KeyCode::Char('7'), &mut ts)), Some(15));
        assert!(handle_key(KeyCode::Char('8'), &mut ts).is_empty());
        handle_key(KeyCode::Left, &mut ts);
        handle_key(KeyCode::Left, &mut ts);
        assert_eq!(toggled_step(&handle_key(KeyCode::Char('1'), &mut ts)), Some(0));
    }

    #[test]
    fn transport_and_filter_keys() {
        let mut ts = state(4, 1);
        assert_eq!(handle_key(KeyCode::Char(' '), &mut ts), vec![InputEvent::PlayStop]);
        assert_eq!(handle_key(KeyCode::Backspace, &mut ts), vec![InputEvent::Reset]);
        assert_eq!(handle_key(KeyCode::Esc, &mut ts), vec![InputEvent::Quit]);
        assert_eq!(handle_key(KeyCode::Char('h'), &mut ts), vec![InputEvent::FilterToggle(FilterKind::HighPass)]);
        assert_eq!(
            handle_key(KeyCode::Char(']'), &mut ts),
            vec![InputEvent::GainNudge { voice: 1, delta: GAIN_STEP }]
        );
        assert!(handle_key(KeyCode::Char('z'), &mut ts).is_empty());
    }

    #[test]
    fn absolute_keys_restore_defaults() {
        let mut ts = state(4, 3);
        assert_eq!(handle_key(KeyCode::Char('t'), &mut ts), vec![InputEvent::TempoChange(90.0)]);
        assert_eq!(
            handle_key(KeyCode::Char('g'), &mut ts),
            vec![InputEvent::GainChange { voice: 3, gain: DEFAULT_GAIN }]
        );
        assert_eq!(
            handle_key(KeyCode::Char('c'), &mut ts),
            vec![InputEvent::FilterParamChange { param: FilterParam::Cutoff, value: DEFAULT_CUTOFF_HZ }]
        );
        assert_eq!(
            handle_key(KeyCode::Char('q'), &mut ts),
            vec![InputEvent::FilterParamChange { param: FilterParam::Resonance, value: DEFAULT_RESONANCE }]
        );
    }
}
