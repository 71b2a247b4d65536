//! The per-surface simulation context driven by the animation loop.
//!
//! One [`Simulation`] exists per rendering surface. The host pushes
//! Expression/Mode, viewport and pointer changes in; the loop calls
//! [`Simulation::step`] once per display refresh and hands the returned
//! [`Frame`] to the renderer.

use crate::audio::{AudioFrame, AudioSource};
use crate::constants::*;
use crate::dance::{DancePose, DanceState};
use crate::face::FaceGeometry;
use crate::mood::{Expression, Mode};
use crate::motion::{MotionContext, MotionState, TiltUpdate};
use crate::render::Frame;
use crate::spring::{smooth, SpringField};
use crate::state::{LoopPhase, TransientState, Viewport};
use crate::targets::{
    impact_kick, mood_targets, snap_tuning, BaseMetrics, MoodTargets, PoseTargets,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LOOK_LIMIT_X: (f32, f32) = (0.15, 0.3); // of width, portrait/landscape
const LOOK_LIMIT_Y: (f32, f32) = (0.1, 0.2); // of height

pub struct Simulation<R: Rng = StdRng> {
    springs: SpringField,
    transient: TransientState,
    motion: MotionState,
    dance: DanceState,
    dance_pose: DancePose,
    audio: AudioFrame,
    viewport: Viewport,
    expression: Expression,
    mode: Mode,
    base: PoseTargets,
    blink_target: f32,
    chromatic_target: f32,
    glitch_intensity: f32,
    pointer: Vec2,
    phase: LoopPhase,
    center: Vec2,
    geometry: FaceGeometry,
    rng: R,
}

impl Simulation<StdRng> {
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_rng(viewport, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(viewport: Viewport) -> Self {
        Self::with_rng(viewport, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulation<R> {
    /// Starts booting, at Idle/Normal, with targets already mapped for
    /// `viewport` and the pointer resting at the centre.
    pub fn with_rng(viewport: Viewport, rng: R) -> Self {
        let springs = SpringField::default();
        let transient = TransientState::default();
        let audio = AudioFrame::default();
        let geometry = FaceGeometry::solve(&springs, &transient, &audio, 1.0, false);
        let initial = mood_targets(Expression::Idle, Mode::Normal, viewport);
        let mut sim = Self {
            springs,
            transient,
            motion: MotionState::default(),
            dance: DanceState::default(),
            dance_pose: DancePose::default(),
            audio,
            viewport,
            expression: Expression::Idle,
            mode: Mode::Normal,
            base: PoseTargets::neutral(&BaseMetrics::for_viewport(viewport)),
            blink_target: 0.0,
            chromatic_target: 0.0,
            glitch_intensity: 0.0,
            pointer: viewport.center(),
            phase: LoopPhase::Booting,
            center: viewport.center(),
            geometry,
            rng,
        };
        sim.apply_targets(initial);
        sim
    }

    /// Retarget for a new Expression/Mode. Recomputes the snap tuning and
    /// injects the impact kick; a no-op when neither changed.
    pub fn set_mood(&mut self, expression: Expression, mode: Mode) {
        if expression == self.expression && mode == self.mode {
            return;
        }
        let previous = self.expression;

        let tuning = snap_tuning(previous, expression);
        self.springs.eye_size.stiffness = tuning.eye_size_stiffness;
        self.springs.eye_size.damping = tuning.eye_size_damping;
        self.springs.mouth_width.stiffness = tuning.mouth_width_stiffness;
        self.springs.mouth_curve.stiffness = tuning.mouth_curve_stiffness;
        self.springs.eye_angle.stiffness = tuning.eye_angle_stiffness;
        self.springs.eye_squint.stiffness = tuning.eye_squint_stiffness;

        if let Some(kick) = impact_kick(previous, expression, mode) {
            self.springs.squash.velocity += kick.squash_velocity;
            self.springs.face_y_offset.velocity += kick.face_y_velocity;
        }

        log::debug!(
            "[sim] mood {} -> {} mode {} snap={}",
            previous,
            expression,
            mode,
            tuning.is_snap()
        );
        self.expression = expression;
        self.mode = mode;
        self.apply_targets(mood_targets(expression, mode, self.viewport));
    }

    /// Resize: re-map the current mood for the new geometry, without a kick.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        let targets = mood_targets(self.expression, self.mode, viewport);
        // A held blink keeps its previous geometry and must not blink again.
        if !targets.blink {
            self.apply_targets(targets);
        }
    }

    /// Most recent pointer/touch position in surface pixels.
    pub fn set_pointer(&mut self, position: Vec2) {
        self.pointer = position;
    }

    /// Booting -> Running. Further calls are ignored.
    pub fn start(&mut self) {
        if self.phase == LoopPhase::Booting {
            self.phase = LoopPhase::Running;
            log::info!("[sim] running");
        }
    }

    fn apply_targets(&mut self, targets: MoodTargets) {
        if let Some(pose) = targets.pose {
            let s = &mut self.springs;
            s.eye_size.target = pose.eye_size;
            s.mouth_width.target = pose.mouth_width;
            s.mouth_curve.target = pose.mouth_curve;
            s.face_y_offset.target = pose.face_y_offset;
            s.eye_squint.target = pose.eye_squint;
            s.eye_angle.target = pose.eye_angle;
            s.tongue.target = pose.tongue;
            s.wink_left.target = pose.wink_left;
            s.wink_right.target = pose.wink_right;
            self.base = pose;
        }
        if let Some(chromatic) = targets.chromatic_offset {
            self.chromatic_target = chromatic;
        }
        self.glitch_intensity = targets.glitch_intensity;
        if targets.blink {
            self.blink_target = 1.0;
            self.transient.blink_speed = BLINK_SPEED_MIN + self.rng.gen::<f32>() * BLINK_SPEED_SPAN;
        }
        self.motion.cancel_furrow();
    }

    /// Advance one frame. `dt` is clamped to [`MAX_FRAME_DT_SEC`]; `now_ms` is
    /// the monotonic clock the blink and furrow deadlines are measured on.
    pub fn step(&mut self, now_ms: f64, dt: f32, audio: &mut dyn AudioSource) -> Frame<'_> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT_SEC)
        } else {
            0.0
        };

        self.audio.refresh(audio);
        self.transient.audio_level = self.audio.level();
        self.transient.twitch = [Vec2::ZERO; 2];
        self.transient.laugh_heave = 0.0;

        let ctx = MotionContext {
            now_ms,
            dt,
            viewport: self.viewport,
            base: &self.base,
        };
        let out = self.motion.step(self.expression, &ctx, &mut self.rng);

        if let Some(width) = out.mouth_width_target {
            self.springs.mouth_width.target = width;
        }
        if let Some(curve) = out.mouth_curve_target {
            self.springs.mouth_curve.target = curve;
        }
        if let Some(squint) = out.squint_target {
            self.springs.eye_squint.target = squint;
        }
        if let Some(speed) = out.blink {
            self.blink_target = 1.0;
            self.transient.blink_speed = speed;
        }
        self.transient.twitch = out.twitch;
        self.transient.laugh_heave = out.heave;
        self.transient.tilt = match out.tilt {
            TiltUpdate::Hold => self.transient.tilt,
            TiltUpdate::Set(tilt) => tilt,
            TiltUpdate::Ease { target, speed } => smooth(self.transient.tilt, target, speed, dt),
        };
        self.transient.breath = self.motion.breath();
        self.transient.float_time = self.motion.float_time();

        self.springs.update_all(dt);

        let t = &mut self.transient;
        t.blink = smooth(t.blink, self.blink_target, t.blink_speed, dt);
        t.chromatic_offset = smooth(
            t.chromatic_offset,
            self.chromatic_target,
            CHROMATIC_EASE_SPEED,
            dt,
        );
        if t.blink > BLINK_RESET_THRESHOLD {
            self.blink_target = 0.0;
        }

        self.dance.advance(self.mode, dt);
        self.dance_pose = self.dance.pose(self.mode, self.viewport, out.bob);

        let half = self.viewport.center();
        let limit = Vec2::new(
            self.viewport.width * self.viewport.pick(LOOK_LIMIT_X),
            self.viewport.height * self.viewport.pick(LOOK_LIMIT_Y),
        );
        let reach = ((self.pointer - half) / half).clamp(Vec2::splat(-1.0), Vec2::ONE);
        let look_target = reach * limit
            + Vec2::new(
                self.dance_pose.sway,
                -self.dance_pose.bounce + t.laugh_heave,
            );
        t.look = Vec2::new(
            smooth(t.look.x, look_target.x, LOOK_EASE_SPEED, dt),
            smooth(t.look.y, look_target.y, LOOK_EASE_SPEED, dt),
        );
        let lag_target = t.look * EYE_LAG_RATIO;
        t.eye_lag = Vec2::new(
            smooth(t.eye_lag.x, lag_target.x, EYE_LAG_EASE_SPEED, dt),
            smooth(t.eye_lag.y, lag_target.y, EYE_LAG_EASE_SPEED, dt),
        );

        self.center = half + Vec2::new(t.look.x, self.springs.face_y_offset.value + t.look.y);
        if self.mode == Mode::Disco {
            t.disco_color = self.dance.disco_color_index();
        }

        self.geometry = FaceGeometry::solve(
            &self.springs,
            &self.transient,
            &self.audio,
            self.dance_pose.scale,
            self.expression.has_playful_tongue(),
        );
        self.frame()
    }

    /// Snapshot of the last stepped frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            viewport: self.viewport,
            phase: self.phase,
            expression: self.expression,
            mode: self.mode,
            center: self.center,
            tilt: self.transient.tilt,
            dance: self.dance_pose,
            chromatic_offset: self.transient.chromatic_offset,
            disco_color: self.transient.disco_color,
            eye_size: self.springs.eye_size.value,
            visualizer: self.audio.visualizer_bins(),
            geometry: self.geometry,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn expression(&self) -> Expression {
        self.expression
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn springs(&self) -> &SpringField {
        &self.springs
    }

    pub fn transient(&self) -> &TransientState {
        &self.transient
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn dance_phase(&self) -> f32 {
        self.dance.phase()
    }

    pub fn dance_pose(&self) -> DancePose {
        self.dance_pose
    }

    /// Targets the mapper last wrote for geometry.
    pub fn base_targets(&self) -> &PoseTargets {
        &self.base
    }

    pub fn blink_target(&self) -> f32 {
        self.blink_target
    }

    pub fn chromatic_target(&self) -> f32 {
        self.chromatic_target
    }

    pub fn glitch_intensity(&self) -> f32 {
        self.glitch_intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silence;

    const DT: f32 = 1.0 / 60.0;

    fn run(sim: &mut Simulation, frames: usize, start_ms: f64) -> f64 {
        let mut now = start_ms;
        for _ in 0..frames {
            now += DT as f64 * 1000.0;
            sim.step(now, DT, &mut Silence);
        }
        now
    }

    #[test]
    fn starts_booting_and_starts_once() {
        let mut sim = Simulation::new(Viewport::default(), 1);
        assert_eq!(sim.phase(), LoopPhase::Booting);
        sim.start();
        sim.start();
        assert_eq!(sim.phase(), LoopPhase::Running);
    }

    #[test]
    fn huge_dt_is_clamped() {
        let mut a = Simulation::new(Viewport::default(), 1);
        let mut b = Simulation::new(Viewport::default(), 1);
        a.set_mood(Expression::Happy, Mode::Disco);
        b.set_mood(Expression::Happy, Mode::Disco);
        a.step(0.0, 10.0, &mut Silence);
        b.step(0.0, MAX_FRAME_DT_SEC, &mut Silence);
        assert_eq!(a.dance_phase(), b.dance_phase());
        assert_eq!(a.springs(), b.springs());
    }

    #[test]
    fn non_finite_dt_is_a_zero_step() {
        let mut sim = Simulation::new(Viewport::default(), 1);
        sim.step(0.0, f32::NAN, &mut Silence);
        assert_eq!(sim.dance_phase(), 0.0);
    }

    #[test]
    fn same_mood_is_a_no_op() {
        let mut sim = Simulation::new(Viewport::default(), 1);
        let before = sim.springs().clone();
        sim.set_mood(Expression::Idle, Mode::Normal);
        assert_eq!(sim.springs(), &before);
    }

    #[test]
    fn mood_change_kicks_squash_and_offset() {
        let mut sim = Simulation::new(Viewport::default(), 1);
        sim.set_mood(Expression::Happy, Mode::Normal);
        assert!((sim.springs().squash.velocity + 0.08 * 3.5).abs() < 1e-6);
        assert!((sim.springs().face_y_offset.velocity + 7.0 * 3.5).abs() < 1e-4);
    }

    #[test]
    fn snap_tuning_is_restored_on_next_transition() {
        let mut sim = Simulation::new(Viewport::default(), 1);
        sim.set_mood(Expression::Evil, Mode::Normal);
        assert!((sim.springs().mouth_width.stiffness - 0.25).abs() < 1e-6);
        sim.set_mood(Expression::Idle, Mode::Normal);
        // Leaving the evil family still snaps.
        assert!((sim.springs().mouth_width.stiffness - 0.25).abs() < 1e-6);
        sim.set_mood(Expression::Happy, Mode::Normal);
        assert!((sim.springs().mouth_width.stiffness - 0.1).abs() < 1e-6);
        assert_eq!(sim.springs().eye_size.damping, EYE_SIZE_SPRING.2);
    }

    #[test]
    fn explicit_blink_randomises_speed() {
        let mut sim = Simulation::new(Viewport::default(), 5);
        sim.set_mood(Expression::Blink, Mode::Normal);
        assert_eq!(sim.blink_target(), 1.0);
        let speed = sim.transient().blink_speed;
        assert!((BLINK_SPEED_MIN..=BLINK_SPEED_MIN + BLINK_SPEED_SPAN).contains(&speed));
    }

    #[test]
    fn retarget_clears_pending_furrow() {
        let mut sim = Simulation::new(Viewport::default(), 9);
        sim.set_mood(Expression::Thinking, Mode::Normal);
        let mut now = 0.0;
        while sim.motion().furrow_revert_at().is_none() && now < 60_000.0 {
            now = run(&mut sim, 1, now);
        }
        assert!(sim.motion().furrow_revert_at().is_some());
        sim.set_mood(Expression::Happy, Mode::Normal);
        assert!(sim.motion().furrow_revert_at().is_none());
    }

    #[test]
    fn resize_retargets_without_kick() {
        let mut sim = Simulation::new(Viewport::new(1600.0, 1000.0), 1);
        sim.set_viewport(Viewport::new(400.0, 800.0));
        assert_eq!(sim.springs().squash.velocity, 0.0);
        assert!((sim.springs().eye_size.target - 50.0).abs() < 1e-3);
        assert!((sim.base_targets().face_y_offset + 60.0).abs() < 1e-3);
    }

    #[test]
    fn pointer_pulls_face_within_limits() {
        let vp = Viewport::new(1000.0, 500.0);
        let mut sim = Simulation::new(vp, 1);
        sim.set_pointer(Vec2::new(5000.0, 250.0));
        run(&mut sim, 600, 0.0);
        let look = sim.transient().look;
        // Landscape reach is 0.3 of the width; the idle sway adds up to 18px.
        assert!(look.x <= 1000.0 * 0.3 + 18.0 + 1e-2);
        assert!(look.x > 200.0);
        assert!(sim.transient().eye_lag.x > 0.0);
    }

    #[test]
    fn geometry_tracks_springs() {
        let mut sim = Simulation::new(Viewport::new(1600.0, 1000.0), 1);
        run(&mut sim, 600, 0.0);
        let eye = sim.frame().geometry.eyes[1];
        assert!((eye.radius_x * 2.0 - 85.0).abs() < 0.5);
    }
}
