//! Boot log released one line per interval before the loop goes live.

use crate::constants::BOOT_LINE_INTERVAL_MS;

pub const BOOT_LINES: [&str; 6] = [
    "MOCHI V1",
    "SYNCING MODES...",
    "LOADING AUDIO_SYNTH.SYS...",
    "ARCH_KERNEL: DETECTED",
    "MIC_INPUT: INITIALIZING...",
    "BOOT COMPLETE.",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BootEvent {
    Line {
        index: usize,
        text: &'static str,
        /// Blip pitch, voiced only once audio is unlocked.
        blip_hz: f32,
    },
    Finished,
}

#[derive(Clone, Debug)]
pub struct BootSequence {
    next_at: f64,
    released: usize,
    finished: bool,
}

impl BootSequence {
    pub fn new(now_ms: f64) -> Self {
        Self {
            next_at: now_ms + BOOT_LINE_INTERVAL_MS,
            released: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(test)]
    fn released(&self) -> usize {
        self.released
    }

    /// Release every line whose interval has elapsed. One extra interval after
    /// the last line reports [`BootEvent::Finished`], exactly once.
    pub fn tick(&mut self, now_ms: f64, out: &mut Vec<BootEvent>) {
        while !self.finished && now_ms >= self.next_at {
            self.next_at += BOOT_LINE_INTERVAL_MS;
            match BOOT_LINES.get(self.released) {
                Some(&text) => {
                    let index = self.released;
                    self.released += 1;
                    out.push(BootEvent::Line {
                        index,
                        text,
                        blip_hz: 200.0 + 50.0 * self.released as f32,
                    });
                }
                None => {
                    self.finished = true;
                    log::info!("[boot] complete");
                    out.push(BootEvent::Finished);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_one_line_per_interval() {
        let mut boot = BootSequence::new(0.0);
        let mut out = Vec::new();
        boot.tick(119.0, &mut out);
        assert!(out.is_empty());
        boot.tick(120.0, &mut out);
        assert_eq!(
            out,
            vec![BootEvent::Line {
                index: 0,
                text: "MOCHI V1",
                blip_hz: 250.0
            }]
        );
    }

    #[test]
    fn finishes_once_after_last_line() {
        let mut boot = BootSequence::new(0.0);
        let mut out = Vec::new();
        boot.tick(120.0 * 6.0, &mut out);
        assert_eq!(boot.released(), 6);
        assert!(!boot.is_finished());
        boot.tick(120.0 * 7.0, &mut out);
        assert!(boot.is_finished());
        boot.tick(10_000.0, &mut out);
        assert_eq!(
            out.iter().filter(|e| **e == BootEvent::Finished).count(),
            1
        );
        assert_eq!(out.len(), 7);
    }
}
