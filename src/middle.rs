// The middle layer owns all sequencer state. The TUI sends it input events
// and asks it for a DisplayState every frame; the main loop calls `tick` so
// the scheduler timer and the frame callback get to run when they are due.
// Everything here runs on the main thread, one call at a time.

use std::time::{Duration, Instant};

use crate::audio::{AudioClock, FilterSettings, SampleId};
use crate::audio_api::{AudioCommand, VoicePlayer};
use crate::config::Settings;
use crate::error::SeqError;
use crate::loader::KitDescriptor;
use crate::sequencer::{
    AnimationConsumer, LookaheadScheduler, RepeatingTask, SchedulerReport, StepQueue, Transport,
};
use crate::shared::{DisplayState, FilterParam, InputEvent, VoiceRow};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub scheduled: Option<SchedulerReport>,
    pub redraw: bool,
}

pub struct Middle {
    kit_name: String,
    transport: Transport,
    queue: StepQueue,
    scheduler: LookaheadScheduler,
    animation: AnimationConsumer,
    timer: RepeatingTask, // scheduler wake-ups
    frame: RepeatingTask, // display refresh
    filter: FilterSettings,
    selected_voice: usize,
    status: String,
}

impl Middle {
    pub fn new(kit: &KitDescriptor, settings: &Settings) -> Self {
        let transport = Transport::for_kit(kit, settings.steps);
        let animation = AnimationConsumer::new(
            transport.voices().len(),
            transport.steps(),
            settings.render_policy,
        );
        let scheduler = LookaheadScheduler::from_settings(settings);
        Self {
            kit_name: kit.name.clone(),
            transport,
            queue: StepQueue::new(),
            timer: RepeatingTask::new(scheduler.lookahead()),
            scheduler,
            animation,
            frame: RepeatingTask::new(settings.frame_interval()),
            filter: FilterSettings::default(),
            selected_voice: 0,
            status: String::new(),
        }
    }

    pub fn attach_sample(&mut self, voice: usize, sample: SampleId) {
        if let Err(e) = self.transport.attach_sample(voice, sample) {
            log::warn!("attach sample: {e}");
        }
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    #[cfg(test)]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    #[cfg(test)]
    pub fn queue(&self) -> &StepQueue {
        &self.queue
    }

    #[cfg(test)]
    pub fn filter(&self) -> FilterSettings {
        self.filter
    }

    // -- input --

    /// Apply one UI event. Returns commands for the audio engine (only the
    /// shared filter is controlled that way; notes go through `tick`).
    pub fn handle_input(&mut self, event: InputEvent, clock: &dyn AudioClock, now: Instant) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        let result = match event {
            InputEvent::PlayStop => {
                if self.transport.is_playing() {
                    self.stop();
                } else {
                    self.start(clock, now);
                }
                Ok(())
            }
            InputEvent::Reset => {
                self.reset();
                Ok(())
            }
            InputEvent::ToggleCell { voice, step } => self.transport.toggle_cell(voice, step).map(|_| ()),
            InputEvent::SelectVoice(delta) => {
                let count = self.transport.voices().len().max(1) as i32;
                self.selected_voice = (self.selected_voice as i32 + delta).rem_euclid(count) as usize;
                Ok(())
            }
            InputEvent::TempoChange(bpm) => self.set_tempo(bpm),
            InputEvent::TempoNudge(delta) => self.set_tempo(self.transport.tempo() + delta),
            InputEvent::GainChange { voice, gain } => self.transport.set_gain(voice, gain).map(|_| ()),
            InputEvent::GainNudge { voice, delta } => match self.transport.voice(voice) {
                Some(slot) => {
                    let gain = slot.gain + delta;
                    self.transport.set_gain(voice, gain).map(|_| ())
                }
                None => Err(SeqError::VoiceOutOfRange { voice, count: self.transport.voices().len() }),
            },
            InputEvent::ToggleVoiceFilter(voice) => match self.transport.voice(voice) {
                Some(slot) => {
                    let filtered = !slot.filtered;
                    self.transport.set_voice_filtered(voice, filtered)
                }
                None => Err(SeqError::VoiceOutOfRange { voice, count: self.transport.voices().len() }),
            },
            InputEvent::FilterToggle(kind) => {
                self.filter.toggle(kind);
                cmds.push(AudioCommand::SetFilter(self.filter));
                Ok(())
            }
            InputEvent::FilterParamChange { param, value } => {
                match param {
                    FilterParam::Cutoff => self.filter.set_cutoff(value),
                    FilterParam::Resonance => self.filter.set_resonance(value),
                }
                cmds.push(AudioCommand::SetFilter(self.filter));
                Ok(())
            }
            InputEvent::FilterParamNudge { param, delta } => {
                match param {
                    // cutoff moves in octaves so the knob feels even across the range
                    FilterParam::Cutoff => self.filter.set_cutoff(self.filter.cutoff_hz * 2f32.powf(delta)),
                    FilterParam::Resonance => self.filter.set_resonance(self.filter.resonance + delta),
                }
                cmds.push(AudioCommand::SetFilter(self.filter));
                Ok(())
            }
            InputEvent::Quit => Ok(()),
        };

        match result {
            Ok(()) => self.status.clear(),
            Err(e) => {
                log::warn!("{e}");
                self.status = e.to_string();
            }
        }
        cmds
    }

    fn set_tempo(&mut self, bpm: f32) -> Result<(), SeqError> {
        let applied = self.transport.set_tempo(bpm)?;
        log::debug!("tempo {applied} bpm");
        Ok(())
    }

    fn start(&mut self, clock: &dyn AudioClock, now: Instant) {
        self.queue.clear();
        self.animation.clear();
        self.transport.start(clock.now());
        // both run on the very next tick
        self.timer.arm_now(now);
        self.frame.arm_now(now);
        log::info!("play at {:.1} bpm", self.transport.tempo());
    }

    // Notes already handed to the engine still sound; only future scheduling
    // and drawing stop here.
    fn stop(&mut self) {
        self.timer.cancel();
        self.frame.cancel();
        self.transport.stop();
        self.animation.clear();
        self.queue.clear();
        log::info!("stop");
    }

    fn reset(&mut self) {
        if self.transport.is_playing() {
            self.stop();
        }
        self.transport.reset();
        self.animation.clear();
    }

    // -- time --

    /// Run whichever of the scheduler timer and the frame callback is due.
    pub fn tick(&mut self, clock: &dyn AudioClock, player: &mut dyn VoicePlayer, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.timer.poll(now) {
            let report = self.scheduler.run(&mut self.transport, &mut self.queue, clock, player);
            if report.steps_scheduled > 0 {
                log::trace!("scheduled {report:?}");
            }
            outcome.scheduled = Some(report);
        }

        if self.frame.poll(now) {
            let audible_now = self.transport.now_from(clock.now());
            outcome.redraw = self
                .animation
                .frame(&mut self.queue, audible_now, self.transport.pattern())
                .is_some();
        }

        outcome
    }

    /// How long the main loop may block before one of the tasks is due.
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        match (self.timer.until_due(now), self.frame.until_due(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -- output --

    pub fn display_state(&self) -> DisplayState {
        let pattern = self.transport.pattern();
        let highlights = self.animation.highlights();
        let rows = self
            .transport
            .voices()
            .iter()
            .enumerate()
            .map(|(i, slot)| VoiceRow {
                name: slot.name.clone(),
                cells: pattern.row(i).to_vec(),
                highlight: highlights.row(i).to_vec(),
                gain: slot.gain,
                filtered: slot.filtered,
                loaded: slot.sample.is_some(),
            })
            .collect();

        DisplayState {
            kit_name: self.kit_name.clone(),
            rows,
            selected_voice: self.selected_voice,
            playing: self.transport.is_playing(),
            displayed_step: self.animation.displayed_step(),
            tempo: self.transport.tempo(),
            default_tempo: self.transport.default_tempo(),
            filter_text: self.filter.label(),
            status_text: self.status.clone(),
        }
    }
}
