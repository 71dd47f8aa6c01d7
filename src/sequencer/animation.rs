// What step is audible right now, as opposed to what was last scheduled.
//
// Runs once per display frame. The scheduler may be a tenth of a second
// ahead of the speakers, so the cursor only moves to entries whose time has
// already passed, and several elapsed entries collapse into the newest one.

use crate::shared::{PadHighlight, RenderPolicy};

use super::pattern::Pattern;
use super::queue::StepQueue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepChange {
    pub from: usize,
    pub to: usize,
}

/// Per-pad highlight state, voices x steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightGrid {
    steps: usize,
    pads: Vec<PadHighlight>,
}

impl HighlightGrid {
    pub fn new(voices: usize, steps: usize) -> Self {
        Self {
            steps,
            pads: vec![PadHighlight::Off; voices * steps],
        }
    }

    #[cfg(test)]
    pub fn get(&self, voice: usize, step: usize) -> PadHighlight {
        if step >= self.steps {
            return PadHighlight::Off;
        }
        self.pads
            .get(voice * self.steps + step)
            .copied()
            .unwrap_or_default()
    }

    pub fn row(&self, voice: usize) -> &[PadHighlight] {
        let start = voice * self.steps;
        self.pads.get(start..start + self.steps).unwrap_or(&[])
    }

    fn set(&mut self, voice: usize, step: usize, value: PadHighlight) {
        if step < self.steps {
            if let Some(p) = self.pads.get_mut(voice * self.steps + step) {
                *p = value;
            }
        }
    }

    /// Unlight the old column and light the new one under `policy`.
    pub fn apply(&mut self, change: StepChange, pattern: &Pattern, policy: RenderPolicy) {
        for voice in 0..pattern.voices() {
            self.set(voice, change.from, PadHighlight::Off);
            let lit = match policy {
                RenderPolicy::AllRows => true,
                RenderPolicy::ActiveOnly => pattern.get(voice, change.to),
            };
            if lit {
                self.set(voice, change.to, PadHighlight::Playing);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pads.iter_mut().for_each(|p| *p = PadHighlight::Off);
    }

    #[cfg(test)]
    pub fn is_clear(&self) -> bool {
        self.pads.iter().all(|p| *p == PadHighlight::Off)
    }
}

#[derive(Clone, Debug)]
pub struct AnimationConsumer {
    steps: usize,
    last_drawn: usize,
    drawn: bool, // false until the first change after a clear
    policy: RenderPolicy,
    highlights: HighlightGrid,
}

impl AnimationConsumer {
    pub fn new(voices: usize, steps: usize, policy: RenderPolicy) -> Self {
        let steps = steps.max(1);
        Self {
            steps,
            // the last step, so that step 0 registers as a change
            last_drawn: steps - 1,
            drawn: false,
            policy,
            highlights: HighlightGrid::new(voices, steps),
        }
    }

    /// One display frame. `now` is transport time.
    pub fn frame(&mut self, queue: &mut StepQueue, now: f64, pattern: &Pattern) -> Option<StepChange> {
        let mut draw_step = self.last_drawn;
        let mut consumed = false;
        while let Some(entry) = queue.pop_elapsed(now) {
            draw_step = entry.step;
            consumed = true;
        }

        // a one-step pattern never changes column, but still has to light up
        let first = consumed && !self.drawn;
        if draw_step == self.last_drawn && !first {
            return None;
        }
        let change = StepChange { from: self.last_drawn, to: draw_step };
        self.highlights.apply(change, pattern, self.policy);
        self.last_drawn = draw_step;
        self.drawn = true;
        Some(change)
    }

    /// Forget everything drawn; called when playback stops.
    pub fn clear(&mut self) {
        self.highlights.clear();
        self.last_drawn = self.steps - 1;
        self.drawn = false;
    }

    #[cfg(test)]
    pub fn last_drawn(&self) -> usize {
        self.last_drawn
    }

    pub fn displayed_step(&self) -> Option<usize> {
        self.drawn.then_some(self.last_drawn)
    }

    #[cfg(test)]
    pub fn policy(&self) -> RenderPolicy {
        self.policy
    }

    pub fn highlights(&self) -> &HighlightGrid {
        &self.highlights
    }
}
