//! Animation, timing and compositing tuning constants.
//!
//! Springs are tuned against a 60 Hz reference frame and the spring field
//! integrates on ticks of exactly that length at any refresh rate.

use crate::state::Color;

// Frame pacing
pub const REFERENCE_FPS: f32 = 60.0;
pub const MAX_FRAME_DT_SEC: f32 = 0.05; // clamp for stalled/backgrounded frames

// Spring defaults: (initial value, stiffness, damping)
pub const EYE_SIZE_SPRING: (f32, f32, f32) = (40.0, 0.12, 0.82);
pub const SQUASH_SPRING: (f32, f32, f32) = (1.0, 0.12, 0.85);
pub const FACE_Y_SPRING: (f32, f32, f32) = (0.0, 0.07, 0.88);
pub const MOUTH_CURVE_SPRING: (f32, f32, f32) = (0.0, 0.1, 0.8);
pub const MOUTH_WIDTH_SPRING: (f32, f32, f32) = (80.0, 0.1, 0.8);
pub const EYE_SQUINT_SPRING: (f32, f32, f32) = (0.0, 0.15, 0.82);
pub const EYE_ANGLE_SPRING: (f32, f32, f32) = (0.0, 0.08, 0.85);
pub const TONGUE_SPRING: (f32, f32, f32) = (0.0, 0.15, 0.75);
pub const WINK_SPRING: (f32, f32, f32) = (0.0, 0.2, 0.8);

// Snap transitions (evil family / pleading)
pub const SNAP_STIFFNESS_MULTIPLIER: f32 = 2.5;
pub const SNAP_EYE_DAMPING: f32 = 0.72;
pub const PLEADING_EYE_STIFFNESS_MULTIPLIER: f32 = 1.8;
pub const PLEADING_ANGLE_STIFFNESS_MULTIPLIER: f32 = 2.0;

// Impact kick on mood change
pub const IMPACT_HIGH_ENERGY: f32 = 3.5;
pub const IMPACT_SPECIAL_MODE: f32 = 2.5;
pub const IMPACT_NEUTRAL: f32 = 1.5;
pub const IMPACT_SQUASH_VELOCITY: f32 = 0.08; // per unit of intensity
pub const IMPACT_FACE_Y_VELOCITY: f32 = 7.0; // px per unit of intensity

// Viewport-normalized base magnitudes
pub const BASE_EYE_RATIO_PORTRAIT: f32 = 0.125; // of the shorter dimension
pub const BASE_EYE_RATIO_LANDSCAPE: f32 = 0.085;
pub const BASE_MOUTH_TO_EYE: f32 = 2.2;
pub const PORTRAIT_Y_BIAS_RATIO: f32 = 0.15;

// Directly-eased scalars
pub const CHROMATIC_EASE_SPEED: f32 = 0.1;
pub const BLINK_RESET_THRESHOLD: f32 = 0.95;
pub const BLINK_SPEED_DEFAULT: f32 = 0.4;
pub const BLINK_SPEED_MIN: f32 = 0.35; // explicit BLINK mood
pub const BLINK_SPEED_SPAN: f32 = 0.35;
pub const LOOK_EASE_SPEED: f32 = 0.12;
pub const EYE_LAG_EASE_SPEED: f32 = 0.1;
pub const EYE_LAG_RATIO: f32 = 0.25;

// Autonomous blink scheduler (ms)
pub const BLINK_GAP_MIN_MS: f64 = 1500.0;
pub const BLINK_GAP_SPAN_MS: f64 = 10000.0;

// Thinking squint-furrow pulse
pub const FURROW_CHANCE_PER_FRAME: f32 = 0.05;
pub const FURROW_REVERT_MIN_MS: f64 = 200.0;
pub const FURROW_REVERT_SPAN_MS: f64 = 300.0;
pub const THINKING_SQUINT: f32 = 0.3;

// Evil laugh
pub const LAUGH_PHASE_RATE: f32 = 35.0; // rad/s
pub const TWITCH_JITTER_PX: f32 = 7.0;
pub const LAUGH_HEAVE_PX: f32 = 15.0;

// Tempo (BPM) per mode; normal keeps the dance phase running
pub const NORMAL_BPM: f32 = 60.0;
pub const PHONK_BPM: f32 = 135.0;
pub const DISCO_BPM: f32 = 128.0;

// Dance amplitudes (portrait, landscape) in px
pub const DANCE_BOUNCE_PX: (f32, f32) = (25.0, 45.0);
pub const DISCO_SWAY_PX: (f32, f32) = (40.0, 85.0);
pub const DANCE_SCALE_PULSE: f32 = 0.25;
pub const DANCE_SCALE_SHARPNESS: i32 = 10;

// Audio modulation
pub const AUDIO_EYE_SCALE: f32 = 0.1;
pub const AUDIO_SQUASH_DAMP: f32 = 0.05;
pub const AUDIO_MOUTH_BREATH_PX: f32 = 10.0;

// Compositing
pub const CHROMATIC_TRIPLE_PASS_THRESHOLD: f32 = 0.15;
pub const FACE_LINE_WIDTH: f32 = 14.0;
pub const VISUALIZER_RADIUS_TO_EYE: (f32, f32) = (4.5, 5.0); // portrait, landscape
pub const BASE_GLOW_BLUR: f32 = 25.0;
pub const SPECIAL_MODE_GLOW_BLUR: f32 = 25.0;
pub const TWITCH_GLOW_BLUR: f32 = 30.0;
pub const VISUALIZER_ALPHA: f32 = 0.4;
pub const BOOT_DIM_ALPHA: f32 = 0.2;

// Palette
pub const DISCO_COLORS: [Color; 6] = [
    Color::rgb(0xff, 0x00, 0xff),
    Color::rgb(0x00, 0xff, 0xff),
    Color::rgb(0xff, 0xff, 0x00),
    Color::rgb(0x00, 0xff, 0x00),
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0xff, 0xff, 0xff),
];
pub const DISCO_GLOW_ALPHA: f32 = 0x22 as f32 / 255.0;
pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
pub const HOT_PINK: Color = Color::rgb(0xff, 0x00, 0x55);
pub const LAUGH_GLOW: Color = Color::rgba(0xff, 0x00, 0x64, 0.25);
pub const PHONK_GLOW: Color = Color::rgba(0xff, 0x00, 0x00, 0.3);
pub const CHROMA_LEFT: Color = Color::rgb(0xff, 0x33, 0x66);
pub const CHROMA_CENTER: Color = Color::rgb(0x00, 0xff, 0xee);
pub const CHROMA_RIGHT: Color = Color::rgb(0x55, 0x99, 0xff);

// Scanlines
pub const SCANLINE_SPACING_PX: (f32, f32) = (6.0, 8.0); // portrait, landscape
pub const SCANLINE_HEIGHT_PX: f32 = 1.5;
pub const SCANLINE_ALPHA: f32 = 0.08;
pub const SCANLINE_ALPHA_HOT: f32 = 0.18;

// Host-side timing (ms)
pub const MODE_FLASH_REVERT_MS: f64 = 500.0;
pub const RANT_DURATION_MS: f64 = 4500.0;
pub const CHAT_ERROR_DURATION_MS: f64 = 3000.0;
pub const MOOD_CYCLE_FIRST_MS: f64 = 3000.0;
pub const MOOD_CYCLE_MIN_MS: f64 = 6000.0;
pub const MOOD_CYCLE_SPAN_MS: f64 = 6000.0;
pub const BOOT_LINE_INTERVAL_MS: f64 = 120.0;
