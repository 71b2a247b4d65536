/// Front-end wiring and synth tuning constants.
///
/// Animation tuning lives in `mochi_core::constants`; this file only covers
/// the browser side: DOM ids, audio graph levels and drum voice recipes.
// DOM element ids
pub const CANVAS_ID: &str = "mochi-canvas";
pub const BOOT_OVERLAY_ID: &str = "boot-overlay";
pub const BOOT_LOG_ID: &str = "boot-log";
pub const SPEECH_ID: &str = "speech-bubble";
pub const MODE_LABEL_ID: &str = "mode-label";
pub const MIC_BADGE_ID: &str = "mic-badge";
pub const CHAT_FORM_ID: &str = "chat-form";
pub const CHAT_INPUT_ID: &str = "chat-input";

// Audio graph
pub const MASTER_GAIN: f32 = 0.5;
pub const ANALYSER_FFT_SIZE: u32 = 256; // 128 bins
pub const SCHEDULE_AHEAD_SEC: f64 = 0.1; // drum hits land slightly in the future
pub const RAMP_FLOOR: f32 = 0.01; // exponential ramps cannot reach zero

// Kick: sine with a pitch dive
pub const KICK_HZ: f32 = 120.0;
pub const KICK_DISTORTED_HZ: f32 = 150.0;
pub const KICK_GAIN: f32 = 0.8;
pub const KICK_DURATION_SEC: f64 = 0.5;

// Hat: filtered white-noise burst
pub const HAT_DURATION_SEC: f64 = 0.05;
pub const HAT_HIGHPASS_HZ: f32 = 8000.0;
pub const HAT_GAIN: f32 = 0.2;

// Cowbell: detuned square pair
pub const COWBELL_HZ: [f32; 2] = [800.0, 540.0];
pub const COWBELL_GAIN: f32 = 0.15;
pub const COWBELL_DURATION_SEC: f64 = 0.2;

// Blip: short sine
pub const BLIP_GAIN: f32 = 0.1;
pub const BOOT_BLIP_SEC: f32 = 0.05;
