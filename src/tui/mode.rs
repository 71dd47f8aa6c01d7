use crate::shared::DisplayState;

// step keys 1-9 address one page of the pattern at a time
pub const STEPS_PER_PAGE: usize = 9;

// state local to tui, just enough to resolve keys into inputevents
// selected_voice, steps and default_tempo are synced from DisplayState per loop,
// page is owned here
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub selected_voice: usize,
    pub steps: usize,
    pub default_tempo: f32,
    pub page: usize,
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.selected_voice = ds.selected_voice;
        self.steps = ds.rows.first().map_or(0, |r| r.cells.len());
        self.default_tempo = ds.default_tempo;
        self.page = self.page.min(self.last_page());
    }

    pub fn last_page(&self) -> usize {
        self.steps.saturating_sub(1) / STEPS_PER_PAGE
    }

    pub fn page_step(&mut self, delta: i32) {
        let page = (self.page as i64 + delta as i64).clamp(0, self.last_page() as i64);
        self.page = page as usize;
    }

    /// Steps the number keys reach right now, as a half-open range.
    pub fn page_range(&self) -> (usize, usize) {
        let first = self.page * STEPS_PER_PAGE;
        (first, (first + STEPS_PER_PAGE).min(self.steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_the_pattern() {
        let mut ts = TuiState { steps: 20, ..TuiState::default() };
        assert_eq!(ts.last_page(), 2);
        ts.page_step(5);
        assert_eq!(ts.page_range(), (18, 20));
        ts.page_step(-9);
        assert_eq!(ts.page_range(), (0, 9));
    }

    #[test]
    fn sync_pulls_the_page_back_onto_the_pattern() {
        use crate::shared::{PadHighlight, VoiceRow};
        let ds = DisplayState {
            kit_name: "t".into(),
            rows: vec![VoiceRow {
                name: "kick".into(),
                cells: vec![false; 4],
                highlight: vec![PadHighlight::Off; 4],
                gain: 1.0,
                filtered: false,
                loaded: true,
            }],
            selected_voice: 0,
            playing: false,
            displayed_step: None,
            tempo: 120.0,
            default_tempo: 100.0,
            filter_text: "off".into(),
            status_text: String::new(),
        };
        let mut ts = TuiState { steps: 16, page: 1, ..TuiState::default() };
        ts.sync(&ds);
        assert_eq!(ts.page, 0);
        assert_eq!(ts.page_range(), (0, 4));
        assert_eq!(ts.default_tempo, 100.0);
    }
}
