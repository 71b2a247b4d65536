//! Sixteenth-note drum sequencer behind the phonk/disco beats.
//!
//! Only sequencing lives here; the front end turns each [`DrumHit`] into
//! WebAudio nodes.

use crate::mood::Mode;
use smallvec::SmallVec;
use std::time::Duration;

pub const STEPS_PER_BAR: u8 = 16;
pub const STEPS_PER_BEAT: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrumVoice {
    /// Pitch-dropping sine kick; distorted kicks start higher.
    Kick { distorted: bool },
    /// Short high-passed noise burst.
    Hat,
    /// Detuned square pair.
    Cowbell,
    Blip { frequency_hz: f32, duration_sec: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrumHit {
    pub step: u8,
    pub voice: DrumVoice,
}

/// Which bar pattern is looping. `Mode::Normal` maps to silence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    Phonk,
    Disco,
}

impl Pattern {
    pub fn for_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Phonk => Some(Pattern::Phonk),
            Mode::Disco => Some(Pattern::Disco),
            Mode::Normal => None,
        }
    }

    pub fn bpm(self) -> f32 {
        match self {
            Pattern::Phonk => Mode::Phonk.bpm(),
            Pattern::Disco => Mode::Disco.bpm(),
        }
    }

    pub fn step_duration_sec(self) -> f64 {
        60.0 / self.bpm() as f64 / STEPS_PER_BEAT
    }

    /// Voices struck on `step` (0..16).
    pub fn hits(self, step: u8) -> SmallVec<[DrumVoice; 4]> {
        let mut voices = SmallVec::new();
        match self {
            Pattern::Phonk => {
                if step % 8 == 0 || step % 8 == 4 {
                    voices.push(DrumVoice::Kick { distorted: true });
                }
                if step % 16 == 10 || step % 16 == 14 {
                    voices.push(DrumVoice::Cowbell);
                }
                if step % 2 == 0 {
                    voices.push(DrumVoice::Hat);
                }
            }
            Pattern::Disco => {
                if step % 4 == 0 {
                    voices.push(DrumVoice::Kick { distorted: false });
                }
                if step % 4 == 2 {
                    voices.push(DrumVoice::Hat);
                }
                if step % 16 == 12 {
                    voices.push(DrumVoice::Blip {
                        frequency_hz: 1200.0,
                        duration_sec: 0.05,
                    });
                }
            }
        }
        voices
    }
}

#[derive(Clone, Debug, Default)]
pub struct DrumMachine {
    pattern: Option<Pattern>,
    step: u8,
    step_accum: f64,
}

impl DrumMachine {
    #[cfg(test)]
    fn step(&self) -> u8 {
        self.step
    }

    /// Switch pattern for `mode`. Re-selecting the running pattern keeps the
    /// bar position; anything else restarts from step 0.
    pub fn set_mode(&mut self, mode: Mode) {
        let next = Pattern::for_mode(mode);
        if next == self.pattern {
            return;
        }
        log::debug!("[beat] pattern {:?} -> {:?}", self.pattern, next);
        self.pattern = next;
        self.step = 0;
        self.step_accum = 0.0;
    }

    /// Silence the machine; the next pattern starts from step 0.
    pub fn stop(&mut self) {
        self.set_mode(Mode::Normal);
    }

    /// Accumulate `dt` and emit hits for every step boundary crossed.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<DrumHit>) {
        let Some(pattern) = self.pattern else {
            return;
        };
        let step_sec = pattern.step_duration_sec();
        self.step_accum += dt.as_secs_f64();
        while self.step_accum >= step_sec {
            self.step_accum -= step_sec;
            let step = self.step;
            out.extend(pattern.hits(step).into_iter().map(|voice| DrumHit { step, voice }));
            self.step = (self.step + 1) % STEPS_PER_BAR;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(pattern: Pattern) -> Vec<DrumHit> {
        let mut dm = DrumMachine::default();
        dm.set_mode(match pattern {
            Pattern::Phonk => Mode::Phonk,
            Pattern::Disco => Mode::Disco,
        });
        let mut out = Vec::new();
        // Slightly over one bar so float drift cannot drop the last step.
        let secs = pattern.step_duration_sec() * STEPS_PER_BAR as f64 + 1e-6;
        dm.tick(Duration::from_secs_f64(secs), &mut out);
        assert_eq!(dm.step(), 0);
        out
    }

    fn count(hits: &[DrumHit], pred: impl Fn(&DrumVoice) -> bool) -> usize {
        hits.iter().filter(|h| pred(&h.voice)).count()
    }

    #[test]
    fn phonk_bar() {
        let hits = bar(Pattern::Phonk);
        assert_eq!(count(&hits, |v| matches!(v, DrumVoice::Kick { distorted: true })), 4);
        assert_eq!(count(&hits, |v| *v == DrumVoice::Cowbell), 2);
        assert_eq!(count(&hits, |v| *v == DrumVoice::Hat), 8);
    }

    #[test]
    fn disco_bar() {
        let hits = bar(Pattern::Disco);
        assert_eq!(count(&hits, |v| matches!(v, DrumVoice::Kick { distorted: false })), 4);
        assert_eq!(count(&hits, |v| *v == DrumVoice::Hat), 4);
        let blips: Vec<_> = hits
            .iter()
            .filter(|h| matches!(h.voice, DrumVoice::Blip { .. }))
            .collect();
        assert_eq!(blips.len(), 1);
        assert_eq!(blips[0].step, 12);
    }

    #[test]
    fn normal_is_silent() {
        let mut dm = DrumMachine::default();
        dm.set_mode(Mode::Normal);
        let mut out = Vec::new();
        dm.tick(Duration::from_secs(5), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn reselecting_pattern_keeps_position() {
        let mut dm = DrumMachine::default();
        dm.set_mode(Mode::Phonk);
        let mut out = Vec::new();
        dm.tick(Duration::from_secs_f64(Pattern::Phonk.step_duration_sec() * 3.5), &mut out);
        assert_eq!(dm.step(), 3);
        dm.set_mode(Mode::Phonk);
        assert_eq!(dm.step(), 3);
        dm.set_mode(Mode::Disco);
        assert_eq!(dm.step(), 0);
    }

    #[test]
    fn stop_silences_and_rewinds() {
        let mut dm = DrumMachine::default();
        dm.set_mode(Mode::Disco);
        let mut out = Vec::new();
        dm.tick(Duration::from_secs_f64(Pattern::Disco.step_duration_sec() * 5.5), &mut out);
        assert_eq!(dm.step(), 5);
        dm.stop();
        out.clear();
        dm.tick(Duration::from_secs(2), &mut out);
        assert!(out.is_empty());
        dm.set_mode(Mode::Disco);
        assert_eq!(dm.step(), 0);
    }

    #[test]
    fn no_step_before_first_interval() {
        let mut dm = DrumMachine::default();
        dm.set_mode(Mode::Disco);
        let mut out = Vec::new();
        dm.tick(Duration::from_millis(10), &mut out);
        assert!(out.is_empty());
    }
}
