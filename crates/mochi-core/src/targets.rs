//! Expression target mapping.
//!
//! Pure functions from (expression, mode, viewport) to the targets written
//! into the spring field, plus the per-transition stiffness retune and the
//! one-shot impact kick. Invoked on mood/mode change, never per frame.

use crate::constants::*;
use crate::mood::{Expression, Mode};
use crate::state::Viewport;

/// Viewport-normalized base magnitudes every pose is scaled from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseMetrics {
    pub eye_size: f32,
    pub mouth_width: f32,
    /// Vertical bias that lifts the face in portrait layouts.
    pub y_bias: f32,
    pub portrait: bool,
}

impl BaseMetrics {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let min_dim = viewport.min_dim();
        let portrait = viewport.is_portrait();
        let eye_ratio = if portrait {
            BASE_EYE_RATIO_PORTRAIT
        } else {
            BASE_EYE_RATIO_LANDSCAPE
        };
        let eye_size = min_dim * eye_ratio;
        Self {
            eye_size,
            mouth_width: eye_size * BASE_MOUTH_TO_EYE,
            y_bias: if portrait {
                -min_dim * PORTRAIT_Y_BIAS_RATIO
            } else {
                0.0
            },
            portrait,
        }
    }

    /// Orientation-dependent pixel offset, plus the portrait bias.
    #[inline]
    fn lift(&self, portrait_px: f32, landscape_px: f32) -> f32 {
        (if self.portrait { portrait_px } else { landscape_px }) + self.y_bias
    }
}

/// Geometry targets for every sprung channel except squash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseTargets {
    pub eye_size: f32,
    pub mouth_width: f32,
    pub mouth_curve: f32,
    pub face_y_offset: f32,
    pub eye_squint: f32,
    pub eye_angle: f32,
    pub tongue: f32,
    pub wink_left: f32,
    pub wink_right: f32,
}

impl PoseTargets {
    /// Base eye/mouth size, no curve, squint, tongue or wink.
    pub fn neutral(base: &BaseMetrics) -> Self {
        Self {
            eye_size: base.eye_size,
            mouth_width: base.mouth_width,
            mouth_curve: 0.0,
            face_y_offset: base.y_bias,
            eye_squint: 0.0,
            eye_angle: 0.0,
            tongue: 0.0,
            wink_left: 0.0,
            wink_right: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.eye_size,
            self.mouth_width,
            self.mouth_curve,
            self.face_y_offset,
            self.eye_squint,
            self.eye_angle,
            self.tongue,
            self.wink_left,
            self.wink_right,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Everything a mood change writes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoodTargets {
    /// `None` holds the current geometry (blink).
    pub pose: Option<PoseTargets>,
    /// `None` holds the current chromatic-offset target.
    pub chromatic_offset: Option<f32>,
    pub glitch_intensity: f32,
    /// Schedule a one-shot blink.
    pub blink: bool,
}

/// Chromatic offset used by expressions that do not set their own.
#[inline]
pub fn mode_chromatic_baseline(mode: Mode) -> f32 {
    match mode {
        Mode::Phonk => 10.0,
        Mode::Disco => 4.0,
        Mode::Normal => 0.0,
    }
}

#[inline]
fn mode_glitch_baseline(mode: Mode) -> f32 {
    if mode == Mode::Phonk {
        0.35
    } else {
        0.0
    }
}

/// Total over the closed enumeration; unlisted moods get the neutral pose.
pub fn mood_targets(expression: Expression, mode: Mode, viewport: Viewport) -> MoodTargets {
    let base = BaseMetrics::for_viewport(viewport);
    let neutral = PoseTargets::neutral(&base);
    let disco = mode == Mode::Disco;
    let mut chromatic = mode_chromatic_baseline(mode);
    let mut glitch = mode_glitch_baseline(mode);

    let pose = match expression {
        Expression::Blink => {
            return MoodTargets {
                pose: None,
                chromatic_offset: None,
                glitch_intensity: glitch,
                blink: true,
            }
        }
        Expression::Idle => PoseTargets {
            eye_angle: if mode == Mode::Phonk { 0.2 } else { 0.0 },
            ..neutral
        },
        Expression::Happy | Expression::Disco => {
            chromatic = if disco { 12.0 } else { 1.0 };
            PoseTargets {
                eye_size: base.eye_size * 1.15,
                mouth_width: base.mouth_width * 1.4,
                mouth_curve: base.eye_size * 0.9,
                face_y_offset: base.lift(-30.0, -40.0),
                eye_squint: if disco { 0.1 } else { 0.65 },
                eye_angle: if disco { -0.2 } else { 0.0 },
                ..neutral
            }
        }
        Expression::Angry | Expression::Evil => {
            let maniacal = expression == Expression::Evil;
            PoseTargets {
                eye_size: base.eye_size * if maniacal { 1.25 } else { 1.1 },
                mouth_width: base.mouth_width * if maniacal { 0.9 } else { 0.8 },
                mouth_curve: base.eye_size * if maniacal { -0.4 } else { -0.5 },
                eye_angle: if maniacal { 0.75 } else { 0.5 },
                eye_squint: 0.55,
                ..neutral
            }
        }
        Expression::Pleading => PoseTargets {
            eye_size: base.eye_size * 1.6,
            mouth_width: base.mouth_width * 0.55,
            mouth_curve: base.eye_size * -0.7,
            eye_squint: 0.15,
            eye_angle: -0.35,
            face_y_offset: base.lift(20.0, 35.0),
            ..neutral
        },
        Expression::TongueSquint => PoseTargets {
            eye_size: base.eye_size * 1.1,
            mouth_width: base.mouth_width * 1.2,
            mouth_curve: base.eye_size * 0.8,
            eye_squint: 0.95,
            tongue: 1.0,
            ..neutral
        },
        Expression::Yum => PoseTargets {
            eye_size: base.eye_size * 1.1,
            mouth_width: base.mouth_width * 1.35,
            mouth_curve: base.eye_size * 1.05,
            eye_squint: 0.65,
            tongue: 0.85,
            eye_angle: -0.05,
            ..neutral
        },
        Expression::TongueWink => PoseTargets {
            eye_size: base.eye_size * 1.3,
            mouth_width: base.mouth_width * 1.45,
            mouth_curve: base.eye_size * 1.15,
            wink_right: 1.0,
            tongue: 1.0,
            eye_angle: -0.15,
            face_y_offset: base.lift(-15.0, -15.0),
            ..neutral
        },
        Expression::Wink => PoseTargets {
            eye_size: base.eye_size * 1.15,
            mouth_width: base.mouth_width * 1.1,
            mouth_curve: base.eye_size * 0.4,
            wink_right: 0.95,
            ..neutral
        },
        Expression::EvilLaugh | Expression::EvilLaughTwitch => {
            let twitch = expression == Expression::EvilLaughTwitch;
            chromatic = if twitch { 80.0 } else { 25.0 };
            glitch = if twitch { 1.0 } else { 0.4 };
            PoseTargets {
                eye_size: base.eye_size * 1.4,
                mouth_width: base.mouth_width * 2.1,
                mouth_curve: base.eye_size * 2.0,
                face_y_offset: base.lift(-40.0, -70.0),
                eye_squint: 0.95,
                eye_angle: 1.1,
                ..neutral
            }
        }
        Expression::Smug => PoseTargets {
            eye_size: base.eye_size * 0.95,
            mouth_width: base.mouth_width * 1.1,
            mouth_curve: base.eye_size * 0.4,
            eye_squint: 0.75,
            eye_angle: -0.4,
            ..neutral
        },
        Expression::Thinking => {
            chromatic = 2.0;
            PoseTargets {
                eye_size: base.eye_size * 0.9,
                mouth_width: base.mouth_width * 0.8,
                mouth_curve: base.eye_size * -0.2,
                eye_squint: THINKING_SQUINT,
                ..neutral
            }
        }
        Expression::Sleepy | Expression::Laughing | Expression::EvilRant | Expression::Dance => {
            neutral
        }
    };

    MoodTargets {
        pose: Some(pose),
        chromatic_offset: Some(chromatic),
        glitch_intensity: glitch,
        blink: false,
    }
}

/// Stiffness/damping baked into the spring field for one transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTuning {
    pub eye_size_stiffness: f32,
    pub eye_size_damping: f32,
    pub mouth_width_stiffness: f32,
    pub mouth_curve_stiffness: f32,
    pub eye_angle_stiffness: f32,
    pub eye_squint_stiffness: f32,
}

impl SnapTuning {
    pub fn is_snap(&self) -> bool {
        self.mouth_width_stiffness > MOUTH_WIDTH_SPRING.1
    }
}

/// Classify a transition. Recomputed on every retarget so it never goes stale.
pub fn snap_tuning(previous: Expression, next: Expression) -> SnapTuning {
    let to_pleading = next == Expression::Pleading;
    let to_evil = next.is_evil();
    let snap = if to_evil || previous.is_evil() || to_pleading {
        SNAP_STIFFNESS_MULTIPLIER
    } else {
        1.0
    };
    SnapTuning {
        eye_size_stiffness: EYE_SIZE_SPRING.1
            * if to_pleading {
                PLEADING_EYE_STIFFNESS_MULTIPLIER
            } else {
                snap
            },
        eye_size_damping: if to_evil || to_pleading {
            SNAP_EYE_DAMPING
        } else {
            EYE_SIZE_SPRING.2
        },
        mouth_width_stiffness: MOUTH_WIDTH_SPRING.1 * snap,
        mouth_curve_stiffness: MOUTH_CURVE_SPRING.1 * snap,
        eye_angle_stiffness: EYE_ANGLE_SPRING.1
            * if to_pleading {
                PLEADING_ANGLE_STIFFNESS_MULTIPLIER
            } else {
                snap
            },
        eye_squint_stiffness: EYE_SQUINT_SPRING.1 * snap,
    }
}

/// Extra velocity injected into squash and face offset on a mood change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    pub squash_velocity: f32,
    pub face_y_velocity: f32,
}

/// `None` when nothing changed or when a blink is involved on either side.
pub fn impact_kick(previous: Expression, next: Expression, mode: Mode) -> Option<Impact> {
    if previous == next || previous == Expression::Blink || next == Expression::Blink {
        return None;
    }
    let intensity = if next.is_high_energy() {
        IMPACT_HIGH_ENERGY
    } else if mode.is_special() {
        IMPACT_SPECIAL_MODE
    } else {
        IMPACT_NEUTRAL
    };
    Some(Impact {
        squash_velocity: -IMPACT_SQUASH_VELOCITY * intensity,
        face_y_velocity: -IMPACT_FACE_Y_VELOCITY * intensity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDSCAPE: Viewport = Viewport {
        width: 1600.0,
        height: 1000.0,
    };

    #[test]
    fn base_metrics_follow_orientation() {
        let land = BaseMetrics::for_viewport(LANDSCAPE);
        assert!((land.eye_size - 85.0).abs() < 1e-3);
        assert!((land.mouth_width - 187.0).abs() < 1e-3);
        assert_eq!(land.y_bias, 0.0);

        let port = BaseMetrics::for_viewport(Viewport::new(400.0, 800.0));
        assert!((port.eye_size - 50.0).abs() < 1e-3);
        assert!((port.y_bias + 60.0).abs() < 1e-3);
    }

    #[test]
    fn evil_laugh_twitch_targets() {
        let t = mood_targets(Expression::EvilLaughTwitch, Mode::Normal, LANDSCAPE);
        let pose = t.pose.expect("twitch has geometry");
        assert!((pose.eye_size - 85.0 * 1.4).abs() < 1e-3);
        assert_eq!(t.chromatic_offset, Some(80.0));
        assert_eq!(t.glitch_intensity, 1.0);
        assert_eq!(pose.face_y_offset, -70.0);
    }

    #[test]
    fn blink_holds_geometry() {
        for mode in Mode::ALL {
            let t = mood_targets(Expression::Blink, mode, LANDSCAPE);
            assert!(t.blink);
            assert!(t.pose.is_none());
            assert!(t.chromatic_offset.is_none());
        }
    }

    #[test]
    fn happy_differs_in_disco() {
        let normal = mood_targets(Expression::Happy, Mode::Normal, LANDSCAPE);
        let disco = mood_targets(Expression::Happy, Mode::Disco, LANDSCAPE);
        assert_eq!(normal.pose.unwrap().eye_squint, 0.65);
        assert_eq!(disco.pose.unwrap().eye_squint, 0.1);
        assert_eq!(disco.chromatic_offset, Some(12.0));
    }

    #[test]
    fn idle_angle_and_chroma_depend_on_mode() {
        let phonk = mood_targets(Expression::Idle, Mode::Phonk, LANDSCAPE);
        assert_eq!(phonk.pose.unwrap().eye_angle, 0.2);
        assert_eq!(phonk.chromatic_offset, Some(10.0));
        assert_eq!(phonk.glitch_intensity, 0.35);
        let disco = mood_targets(Expression::Idle, Mode::Disco, LANDSCAPE);
        assert_eq!(disco.chromatic_offset, Some(4.0));
    }

    #[test]
    fn unlisted_moods_fall_back_to_neutral() {
        let idle = mood_targets(Expression::Idle, Mode::Normal, LANDSCAPE);
        for e in [Expression::Sleepy, Expression::Dance, Expression::Laughing] {
            assert_eq!(mood_targets(e, Mode::Normal, LANDSCAPE).pose, idle.pose);
        }
    }

    #[test]
    fn snap_classification() {
        assert!(snap_tuning(Expression::Idle, Expression::Evil).is_snap());
        assert!(snap_tuning(Expression::EvilLaugh, Expression::Idle).is_snap());
        assert!(snap_tuning(Expression::Idle, Expression::Pleading).is_snap());
        assert!(!snap_tuning(Expression::Idle, Expression::Happy).is_snap());

        let leaving = snap_tuning(Expression::Evil, Expression::Idle);
        assert_eq!(leaving.eye_size_damping, EYE_SIZE_SPRING.2);
        let pleading = snap_tuning(Expression::Idle, Expression::Pleading);
        assert!((pleading.eye_size_stiffness - 0.12 * 1.8).abs() < 1e-6);
        assert!((pleading.eye_angle_stiffness - 0.08 * 2.0).abs() < 1e-6);
        assert_eq!(pleading.eye_size_damping, SNAP_EYE_DAMPING);
    }

    #[test]
    fn impact_intensity_tiers() {
        let high = impact_kick(Expression::Idle, Expression::Happy, Mode::Normal).unwrap();
        assert!((high.face_y_velocity + 7.0 * 3.5).abs() < 1e-4);
        let special = impact_kick(Expression::Idle, Expression::Smug, Mode::Phonk).unwrap();
        assert!((special.squash_velocity + 0.08 * 2.5).abs() < 1e-6);
        let neutral = impact_kick(Expression::Idle, Expression::Smug, Mode::Normal).unwrap();
        assert!((neutral.face_y_velocity + 7.0 * 1.5).abs() < 1e-4);
    }

    #[test]
    fn blink_and_repeats_do_not_kick() {
        assert!(impact_kick(Expression::Idle, Expression::Blink, Mode::Normal).is_none());
        assert!(impact_kick(Expression::Blink, Expression::Happy, Mode::Normal).is_none());
        assert!(impact_kick(Expression::Happy, Expression::Happy, Mode::Disco).is_none());
    }
}
