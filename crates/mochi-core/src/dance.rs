//! Beat-synchronised dance kinematics.
//!
//! The phase accumulator runs in every mode and is never reset, so switching
//! mode only changes how the phase is mapped onto bounce/sway/scale/rotation.

use crate::constants::*;
use crate::mood::Mode;
use crate::state::Viewport;
use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Body-level motion derived from the dance phase for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DancePose {
    /// Upward displacement in px.
    pub bounce: f32,
    pub sway: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl Default for DancePose {
    fn default() -> Self {
        Self {
            bounce: 0.0,
            sway: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DanceState {
    phase: f32,
}

impl DanceState {
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Accumulate `(dt / seconds_per_beat) * 2π` at the mode's tempo.
    pub fn advance(&mut self, mode: Mode, dt: f32) {
        let seconds_per_beat = 60.0 / mode.bpm();
        self.phase += (dt.max(0.0) / seconds_per_beat) * TAU;
    }

    /// Map the phase onto body motion. Outside dancing modes the idle bob
    /// (`x` sway, `y` bob) passes straight through.
    pub fn pose(&self, mode: Mode, viewport: Viewport, idle_bob: Vec2) -> DancePose {
        let dancing = mode.is_special();
        let beat = self.phase.sin().abs();
        let bounce = if dancing {
            beat * viewport.pick(DANCE_BOUNCE_PX)
        } else {
            idle_bob.y
        };
        let sway = match mode {
            Mode::Disco => (self.phase / 2.0).sin() * viewport.pick(DISCO_SWAY_PX),
            Mode::Phonk => 0.0,
            Mode::Normal => idle_bob.x,
        };
        let scale = if dancing {
            1.0 + beat.powi(DANCE_SCALE_SHARPNESS) * DANCE_SCALE_PULSE
        } else {
            1.0
        };
        let rotation = match mode {
            Mode::Phonk => (self.phase / 4.0).sin() * 0.06,
            Mode::Disco => (self.phase / 2.0).sin() * 0.12,
            Mode::Normal => 0.0,
        };
        DancePose {
            bounce,
            sway,
            scale,
            rotation,
        }
    }

    /// Palette slot for the disco glow; advances every half beat.
    pub fn disco_color_index(&self) -> usize {
        ((self.phase / PI).floor().max(0.0) as usize) % DISCO_COLORS.len()
    }
}
