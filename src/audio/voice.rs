use super::frame::StereoFrame;
use super::sample_buffer::{SampleBuffer, SampleId};

/// One playing instance of a sample. Voices live in the engine's fixed pool
/// and are recycled once they run off the end of their buffer.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub sample_id: SampleId,
    pub gain: f32,
    pub filtered: bool, // mixed into the shared filter bus instead of the dry bus
    pub active: bool,
    pos: usize,
    started_at: u64, // absolute frame, used to pick a voice to steal
}

impl Voice {
    pub fn new(sample_id: SampleId, gain: f32, filtered: bool, started_at: u64) -> Self {
        Self {
            sample_id,
            gain,
            filtered,
            active: true,
            pos: 0,
            started_at,
        }
    }

    pub fn idle() -> Self {
        Self {
            active: false,
            ..Self::new(SampleId(u64::MAX), 0.0, false, 0)
        }
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    // add this voice into `out`, advancing its read head; goes inactive at
    // the end of the buffer
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        let remaining = buffer.data.len().saturating_sub(self.pos);
        let n = remaining.min(out.len());
        for (dst, src) in out[..n].iter_mut().zip(&buffer.data[self.pos..self.pos + n]) {
            dst.mix_in(*src, self.gain);
        }
        self.pos += n;
        if self.pos >= buffer.data.len() {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> SampleBuffer {
        SampleBuffer {
            data: (0..len).map(|i| StereoFrame::mono(i as f32)).collect(),
        }
    }

    #[test]
    fn renders_with_gain_and_finishes() {
        let buf = ramp(6);
        let mut v = Voice::new(SampleId(1), 0.5, false, 0);
        let mut out = vec![StereoFrame::zero(); 4];
        v.render_into(&buf, &mut out);
        assert_eq!(out[3].left, 1.5);
        assert!(v.active);
        assert_eq!(v.position(), 4);

        let mut out = vec![StereoFrame::zero(); 4];
        v.render_into(&buf, &mut out);
        assert_eq!(out[0].left, 2.0);
        assert_eq!(out[1].left, 2.5);
        assert_eq!(out[2].left, 0.0); // past the end stays silent
        assert!(!v.active);
    }

    #[test]
    fn idle_voice_renders_nothing() {
        let buf = ramp(4);
        let mut v = Voice::idle();
        let mut out = vec![StereoFrame::zero(); 4];
        v.render_into(&buf, &mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
    }
}
