// Host-side tests for front-end constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use mochi_core::Pattern;

#[test]
#[allow(clippy::assertions_on_constants)]
fn gains_are_within_unity() {
    for g in [MASTER_GAIN, KICK_GAIN, HAT_GAIN, COWBELL_GAIN, BLIP_GAIN] {
        assert!(g > 0.0 && g <= 1.0, "gain {g}");
    }
    assert!(RAMP_FLOOR > 0.0);
    assert!(RAMP_FLOOR < BLIP_GAIN);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn analyser_size_is_a_power_of_two() {
    assert!(ANALYSER_FFT_SIZE.is_power_of_two());
    assert!((32..=32768).contains(&ANALYSER_FFT_SIZE));
}

#[test]
fn drum_voices_fit_inside_one_step() {
    let shortest = Pattern::Phonk
        .step_duration_sec()
        .min(Pattern::Disco.step_duration_sec());
    assert!(SCHEDULE_AHEAD_SEC < shortest);
    assert!(HAT_DURATION_SEC < shortest);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn distorted_kick_starts_higher() {
    assert!(KICK_DISTORTED_HZ > KICK_HZ);
    assert!(HAT_HIGHPASS_HZ > COWBELL_HZ[0]);
}
