// The look-ahead scheduler.
//
// The timer that wakes us is coarse and jittery, the audio clock is not. So
// every wake-up commits all steps due before `now + schedule_ahead` to the
// voice player with exact timestamps; as long as the horizon is wider than
// the timer's worst lateness, nothing is ever scheduled late.

use std::time::Duration;

use crate::audio::AudioClock;
use crate::audio_api::VoicePlayer;
use crate::config::Settings;
use crate::error::PlayError;

use super::queue::StepQueue;
use super::transport::Transport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub steps_scheduled: usize,
    pub voices_triggered: usize,
    pub voices_dropped: usize,
}

#[derive(Clone, Debug)]
pub struct LookaheadScheduler {
    lookahead: Duration,
    schedule_ahead: f64,
}

impl Default for LookaheadScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(25), 0.1)
    }
}

impl LookaheadScheduler {
    pub fn new(lookahead: Duration, schedule_ahead: f64) -> Self {
        if schedule_ahead <= lookahead.as_secs_f64() {
            log::warn!(
                "schedule ahead {schedule_ahead}s does not cover the {}ms timer; late wake-ups will play late",
                lookahead.as_millis()
            );
        }
        Self { lookahead, schedule_ahead }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.lookahead(), settings.schedule_ahead_secs)
    }

    /// Interval the caller should re-arm the timer with.
    pub fn lookahead(&self) -> Duration {
        self.lookahead
    }

    /// One timer firing. A `while`, not an `if`: after a long stall every
    /// missed step is committed in order, none skipped.
    pub fn run(
        &self,
        transport: &mut Transport,
        queue: &mut StepQueue,
        clock: &dyn AudioClock,
        player: &mut dyn VoicePlayer,
    ) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        if !transport.is_playing() {
            return report;
        }

        while transport.next_step_time() < transport.now_from(clock.now()) + self.schedule_ahead {
            let step = transport.current_step();
            let due = transport.next_step_time();
            let start_time = transport.to_clock_time(due);

            for voice in transport.pattern().active_at(step) {
                let Some(slot) = transport.voice(voice) else {
                    continue;
                };
                // gain and routing are read now, not when the cell was armed
                let played = match slot.sample {
                    Some(sample) => player.play(sample, start_time, slot.gain, slot.filtered),
                    None => Err(PlayError::SampleNotReady),
                };
                match played {
                    Ok(()) => report.voices_triggered += 1,
                    Err(e) => {
                        log::debug!("step {step}: dropped voice {voice} ({}): {e}", slot.name);
                        report.voices_dropped += 1;
                    }
                }
            }

            queue.push(step, due);
            transport.advance_step();
            report.steps_scheduled += 1;
        }

        report
    }
}
