//! Visual-side state types shared with the web frontend.
//!
//! These types avoid referencing platform-specific APIs. The frontend feeds
//! the viewport and pointer in, and reads colors back out when it paints.

use glam::Vec2;

/// Straight-alpha sRGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// CSS `rgba(...)` form accepted by canvas style setters.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Drawing surface dimensions in backing-store pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    #[inline]
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    #[inline]
    pub fn min_dim(&self) -> f32 {
        self.width.min(self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Pick the portrait or landscape entry of a `(portrait, landscape)` pair.
    #[inline]
    pub fn pick<T: Copy>(&self, pair: (T, T)) -> T {
        if self.is_portrait() {
            pair.0
        } else {
            pair.1
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Externally observable loop states. The transition is one-way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopPhase {
    #[default]
    Booting,
    Running,
}

/// Un-sprung scalars mutated directly every frame.
#[derive(Clone, Debug)]
pub struct TransientState {
    pub blink: f32,
    pub blink_speed: f32,
    pub chromatic_offset: f32,
    pub look: Vec2,
    pub eye_lag: Vec2,
    pub tilt: f32,
    pub breath: f32,
    pub float_time: f32,
    /// Per-eye local offsets, zeroed at the start of every frame.
    pub twitch: [Vec2; 2],
    pub laugh_heave: f32,
    pub disco_color: usize,
    pub audio_level: f32,
}

impl Default for TransientState {
    fn default() -> Self {
        Self {
            blink: 0.0,
            blink_speed: crate::constants::BLINK_SPEED_DEFAULT,
            chromatic_offset: 0.0,
            look: Vec2::ZERO,
            eye_lag: Vec2::ZERO,
            tilt: 0.0,
            breath: 0.0,
            float_time: 0.0,
            twitch: [Vec2::ZERO; 2],
            laugh_heave: 0.0,
            disco_color: 0,
            audio_level: 0.0,
        }
    }
}
