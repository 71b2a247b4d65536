//! Damped second-order spring channels.
//!
//! Each channel is advanced every frame regardless of whether its target
//! changed, so motion already in flight keeps settling smoothly. The field
//! integrates on fixed 60 Hz ticks, so the same elapsed time lands on the
//! same state at any display refresh rate.

use crate::constants::*;

/// One animated scalar channel converging toward `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub value: f32,
    pub target: f32,
    pub velocity: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    pub const fn new(value: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            value,
            target: value,
            velocity: 0.0,
            stiffness,
            damping,
        }
    }

    const fn from_tuning(tuning: (f32, f32, f32)) -> Self {
        Self::new(tuning.0, tuning.1, tuning.2)
    }

    /// Advance by `dt` seconds. Velocity and stiffness are tuned per 60 Hz
    /// frame; only the positional increment is scaled by elapsed time.
    #[inline]
    pub fn update(&mut self, dt: f32) {
        let force = (self.target - self.value) * self.stiffness;
        self.velocity = (self.velocity + force) * self.damping;
        self.value += self.velocity * dt * REFERENCE_FPS;
    }
}

/// Frame-rate independent exponential ease toward `target`.
#[inline]
pub fn smooth(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    let factor = 1.0 - (-speed * dt * REFERENCE_FPS).exp();
    current + (target - current) * factor
}

/// Names of the sprung channels, in field order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    EyeSize,
    Squash,
    FaceYOffset,
    MouthCurve,
    MouthWidth,
    EyeSquint,
    EyeAngle,
    Tongue,
    WinkLeft,
    WinkRight,
}

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::EyeSize,
        Channel::Squash,
        Channel::FaceYOffset,
        Channel::MouthCurve,
        Channel::MouthWidth,
        Channel::EyeSquint,
        Channel::EyeAngle,
        Channel::Tongue,
        Channel::WinkLeft,
        Channel::WinkRight,
    ];
}

/// Slack for float drift when summing many short frames into ticks.
const TICK_EPSILON_SEC: f32 = 1e-4;

/// Every sprung channel of the face.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringField {
    pub eye_size: Spring,
    pub squash: Spring,
    pub face_y_offset: Spring,
    pub mouth_curve: Spring,
    pub mouth_width: Spring,
    pub eye_squint: Spring,
    pub eye_angle: Spring,
    pub tongue: Spring,
    pub wink_left: Spring,
    pub wink_right: Spring,
    /// Elapsed time not yet consumed by a whole tick.
    pending_sec: f32,
}

impl Default for SpringField {
    fn default() -> Self {
        Self {
            eye_size: Spring::from_tuning(EYE_SIZE_SPRING),
            squash: Spring::from_tuning(SQUASH_SPRING),
            face_y_offset: Spring::from_tuning(FACE_Y_SPRING),
            mouth_curve: Spring::from_tuning(MOUTH_CURVE_SPRING),
            mouth_width: Spring::from_tuning(MOUTH_WIDTH_SPRING),
            eye_squint: Spring::from_tuning(EYE_SQUINT_SPRING),
            eye_angle: Spring::from_tuning(EYE_ANGLE_SPRING),
            tongue: Spring::from_tuning(TONGUE_SPRING),
            wink_left: Spring::from_tuning(WINK_SPRING),
            wink_right: Spring::from_tuning(WINK_SPRING),
            pending_sec: 0.0,
        }
    }
}

impl SpringField {
    pub fn get(&self, channel: Channel) -> &Spring {
        match channel {
            Channel::EyeSize => &self.eye_size,
            Channel::Squash => &self.squash,
            Channel::FaceYOffset => &self.face_y_offset,
            Channel::MouthCurve => &self.mouth_curve,
            Channel::MouthWidth => &self.mouth_width,
            Channel::EyeSquint => &self.eye_squint,
            Channel::EyeAngle => &self.eye_angle,
            Channel::Tongue => &self.tongue,
            Channel::WinkLeft => &self.wink_left,
            Channel::WinkRight => &self.wink_right,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Spring> {
        [
            &mut self.eye_size,
            &mut self.squash,
            &mut self.face_y_offset,
            &mut self.mouth_curve,
            &mut self.mouth_width,
            &mut self.eye_squint,
            &mut self.eye_angle,
            &mut self.tongue,
            &mut self.wink_left,
            &mut self.wink_right,
        ]
        .into_iter()
    }

    /// Advance every channel, including ones whose target did not move, by
    /// as many whole 60 Hz ticks as `dt` completes. Returns the tick count.
    pub fn update_all(&mut self, dt: f32) -> u32 {
        let tick = 1.0 / REFERENCE_FPS;
        self.pending_sec += dt.max(0.0);
        let mut ticks = 0;
        while self.pending_sec + TICK_EPSILON_SEC >= tick {
            self.pending_sec -= tick;
            for spring in self.iter_mut() {
                spring.update(tick);
            }
            ticks += 1;
        }
        ticks
    }
}
