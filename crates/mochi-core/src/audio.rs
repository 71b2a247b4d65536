//! Audio-reactive sampling.
//!
//! The sampler never owns an audio source; it reads whatever the collaborator
//! exposes once per frame. No source, or one that is not initialised yet,
//! reads as silence and every modulation falls back to baseline.

use crate::constants::{AUDIO_EYE_SCALE, AUDIO_MOUTH_BREATH_PX, AUDIO_SQUASH_DAMP};

/// Live frequency readings from the audio collaborator. Must never block.
pub trait AudioSource {
    /// Byte magnitudes (0-255) per frequency bin; empty before initialisation.
    fn frequency_data(&mut self) -> &[u8];
}

/// Source used before an audio context exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl AudioSource for Silence {
    fn frequency_data(&mut self) -> &[u8] {
        &[]
    }
}

impl<S: AudioSource> AudioSource for Option<S> {
    fn frequency_data(&mut self) -> &[u8] {
        match self {
            Some(s) => s.frequency_data(),
            None => &[],
        }
    }
}

/// Mean of the bins, 0 for an empty spectrum.
pub fn average_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|b| *b as f32).sum::<f32>() / bins.len() as f32
}

/// One frame's worth of readings; the bin buffer is reused across frames.
#[derive(Clone, Debug, Default)]
pub struct AudioFrame {
    bins: Vec<u8>,
    level: f32,
}

impl AudioFrame {
    pub fn refresh(&mut self, source: &mut dyn AudioSource) {
        let data = source.frequency_data();
        self.bins.clear();
        self.bins.extend_from_slice(data);
        self.level = average_level(&self.bins);
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    /// Average level, 0-255.
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    fn norm(&self) -> f32 {
        (self.level / 255.0).clamp(0.0, 1.0)
    }

    pub fn eye_scale(&self) -> f32 {
        1.0 + self.norm() * AUDIO_EYE_SCALE
    }

    pub fn squash_damp(&self) -> f32 {
        1.0 - self.norm() * AUDIO_SQUASH_DAMP
    }

    /// Idle breathing term plus the loudness addend, added to the mouth curve.
    pub fn mouth_breath(&self, breath_phase: f32) -> f32 {
        (breath_phase * 0.6).sin() * 5.0 + self.norm() * AUDIO_MOUTH_BREATH_PX
    }

    /// Bins drawn as visualizer rays: the lower half of the spectrum.
    pub fn visualizer_bins(&self) -> &[u8] {
        &self.bins[..self.bins.len() / 2]
    }
}
