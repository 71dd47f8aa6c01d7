use crate::error::SeqError;

/// The trigger grid: one row per voice, one column per step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    voices: usize,
    steps: usize,
    cells: Vec<bool>, // row-major
}

impl Pattern {
    pub fn new(voices: usize, steps: usize) -> Self {
        Self {
            voices,
            steps,
            cells: vec![false; voices * steps],
        }
    }

    pub fn voices(&self) -> usize {
        self.voices
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn get(&self, voice: usize, step: usize) -> bool {
        voice < self.voices && step < self.steps && self.cells[voice * self.steps + step]
    }

    fn index(&self, voice: usize, step: usize) -> Result<usize, SeqError> {
        if voice >= self.voices {
            return Err(SeqError::VoiceOutOfRange { voice, count: self.voices });
        }
        if step >= self.steps {
            return Err(SeqError::StepOutOfRange { step, count: self.steps });
        }
        Ok(voice * self.steps + step)
    }

    #[cfg(test)]
    pub fn set(&mut self, voice: usize, step: usize, value: bool) -> Result<(), SeqError> {
        let i = self.index(voice, step)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Flip one cell, returning its new value.
    pub fn toggle(&mut self, voice: usize, step: usize) -> Result<bool, SeqError> {
        let i = self.index(voice, step)?;
        self.cells[i] = !self.cells[i];
        Ok(self.cells[i])
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    pub fn row(&self, voice: usize) -> &[bool] {
        if voice >= self.voices {
            return &[];
        }
        &self.cells[voice * self.steps..(voice + 1) * self.steps]
    }

    /// Voices armed at `step`, top row first.
    pub fn active_at(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.voices).filter(move |&v| self.get(v, step))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }
}
