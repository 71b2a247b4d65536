//! Face geometry solver.
//!
//! Pure function of the spring values, the per-eye twitch/lag offsets and the
//! audio modulation. Coordinates are local to the face origin, before the
//! renderer applies the body translation and rotation.

use crate::audio::AudioFrame;
use crate::spring::SpringField;
use crate::state::TransientState;
use glam::Vec2;

const EYE_SPACING_TO_SIZE: f32 = 2.6;
const EYE_Y: f32 = -20.0;
const MIN_EYE_HEIGHT: f32 = 1.0;
const MOUTH_Y: f32 = 80.0;
const MOUTH_CURVE_GAIN: f32 = 1.8;
const TONGUE_THRESHOLD: f32 = 0.05;
const TONGUE_WIDTH_TO_MOUTH: f32 = 0.45;
const TONGUE_LENGTH_PX: f32 = 45.0;
const TONGUE_DROP_PX: f32 = 8.0;
const TONGUE_CORNER_RADIUS: f32 = 30.0;

/// A filled ellipse drawn inside its own translated/rotated/scaled frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeShape {
    pub center: Vec2,
    pub angle: f32,
    pub scale: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

/// Quadratic stroke between two anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthShape {
    pub left: Vec2,
    pub control: Vec2,
    pub right: Vec2,
}

/// Rectangle hanging down from `anchor`, rounded at its two lower corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TongueShape {
    pub anchor: Vec2,
    pub rotation: f32,
    pub width: f32,
    pub length: f32,
    pub corner_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceGeometry {
    /// Left, right.
    pub eyes: [EyeShape; 2],
    pub mouth: MouthShape,
    pub tongue: Option<TongueShape>,
}

impl FaceGeometry {
    /// `body_scale` is the dance pulse; `playful` offsets and wags the tongue.
    pub fn solve(
        springs: &SpringField,
        transient: &TransientState,
        audio: &AudioFrame,
        body_scale: f32,
        playful: bool,
    ) -> Self {
        let eye_size = springs.eye_size.value;
        let spacing = eye_size * EYE_SPACING_TO_SIZE * audio.eye_scale();
        let squash = springs.squash.value;
        let eye_scale = Vec2::new(body_scale, squash * audio.squash_damp() * body_scale);
        let radius = eye_size / 2.0;
        let squint = springs.eye_squint.value.max(transient.blink);

        let eye = |side: f32, twitch: Vec2, angle: f32, wink: f32| {
            let closed = squint.max(wink);
            EyeShape {
                center: Vec2::new(side * spacing, EYE_Y) + twitch + transient.eye_lag,
                angle,
                scale: eye_scale,
                radius_x: radius,
                radius_y: (radius * (1.0 - closed)).max(MIN_EYE_HEIGHT),
            }
        };
        let angle = springs.eye_angle.value;
        let eyes = [
            eye(-1.0, transient.twitch[0], -angle, springs.wink_left.value),
            eye(1.0, transient.twitch[1], angle, springs.wink_right.value),
        ];

        let half_width = springs.mouth_width.value / 2.0;
        let curve = springs.mouth_curve.value + audio.mouth_breath(transient.breath);
        let mouth = MouthShape {
            left: Vec2::new(-half_width * body_scale, MOUTH_Y),
            control: Vec2::new(0.0, MOUTH_Y + curve * MOUTH_CURVE_GAIN * squash * body_scale),
            right: Vec2::new(half_width * body_scale, MOUTH_Y),
        };

        let extension = springs.tongue.value;
        let tongue = (extension > TONGUE_THRESHOLD).then(|| {
            let (offset, rotation) = if playful {
                (
                    half_width * 0.55,
                    0.15 + (transient.float_time * 0.1).sin() * 0.05,
                )
            } else {
                (0.0, 0.0)
            };
            TongueShape {
                anchor: Vec2::new(offset, MOUTH_Y + TONGUE_DROP_PX),
                rotation,
                width: springs.mouth_width.value * TONGUE_WIDTH_TO_MOUTH,
                length: extension * TONGUE_LENGTH_PX,
                corner_radius: TONGUE_CORNER_RADIUS,
            }
        });

        Self {
            eyes,
            mouth,
            tongue,
        }
    }

    /// At least one primitive has a visible extent.
    pub fn is_visible(&self) -> bool {
        let eyes = self
            .eyes
            .iter()
            .any(|e| e.radius_x > 0.0 && e.radius_y > 0.0 && e.scale.x != 0.0 && e.scale.y != 0.0);
        let mouth = (self.mouth.right.x - self.mouth.left.x).abs() > 0.0;
        eyes || mouth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_default(transient: &TransientState, springs: &SpringField) -> FaceGeometry {
        FaceGeometry::solve(springs, transient, &AudioFrame::default(), 1.0, false)
    }

    #[test]
    fn eyes_mirror_around_origin() {
        let springs = SpringField::default();
        let geo = solve_default(&TransientState::default(), &springs);
        assert_eq!(geo.eyes[0].center.x, -geo.eyes[1].center.x);
        assert_eq!(geo.eyes[0].center.y, EYE_Y);
        assert!((geo.eyes[1].center.x - 40.0 * 2.6).abs() < 1e-4);
        assert_eq!(geo.eyes[0].radius_y, 20.0);
    }

    #[test]
    fn eye_height_uses_max_of_squint_blink_and_wink() {
        let mut springs = SpringField::default();
        springs.eye_squint.value = 0.2;
        springs.wink_right.value = 0.9;
        let mut transient = TransientState::default();
        transient.blink = 0.5;
        let geo = solve_default(&transient, &springs);
        assert!((geo.eyes[0].radius_y - 20.0 * 0.5).abs() < 1e-4);
        assert!((geo.eyes[1].radius_y - 20.0 * 0.1).abs() < 1e-4);
    }

    #[test]
    fn closed_eye_keeps_a_sliver() {
        let springs = SpringField::default();
        let mut transient = TransientState::default();
        transient.blink = 1.0;
        let geo = solve_default(&transient, &springs);
        assert_eq!(geo.eyes[0].radius_y, MIN_EYE_HEIGHT);
        assert!(geo.is_visible());
    }

    #[test]
    fn tongue_appears_past_threshold() {
        let mut springs = SpringField::default();
        springs.tongue.value = 0.04;
        assert!(solve_default(&TransientState::default(), &springs).tongue.is_none());
        springs.tongue.value = 1.0;
        let tongue = solve_default(&TransientState::default(), &springs)
            .tongue
            .unwrap();
        assert_eq!(tongue.anchor, Vec2::new(0.0, 88.0));
        assert!((tongue.width - 36.0).abs() < 1e-4);
        assert_eq!(tongue.length, 45.0);
    }

    #[test]
    fn playful_tongue_hangs_to_the_side() {
        let mut springs = SpringField::default();
        springs.tongue.value = 1.0;
        let geo = FaceGeometry::solve(
            &springs,
            &TransientState::default(),
            &AudioFrame::default(),
            1.0,
            true,
        );
        let tongue = geo.tongue.unwrap();
        assert!((tongue.anchor.x - 40.0 * 0.55).abs() < 1e-4);
        assert!((tongue.rotation - 0.15).abs() < 1e-6);
    }

    #[test]
    fn mouth_control_follows_curve_and_squash() {
        let mut springs = SpringField::default();
        springs.mouth_curve.value = 10.0;
        springs.squash.value = 0.5;
        let geo = solve_default(&TransientState::default(), &springs);
        assert!((geo.mouth.control.y - (80.0 + 10.0 * 1.8 * 0.5)).abs() < 1e-4);
        assert_eq!(geo.mouth.left.x, -40.0);
    }
}
