//! Per-frame procedural motion generators.
//!
//! One branch per expression. Each branch advances its own phase and returns
//! a [`MotionOutput`] that the simulation applies uniformly: target edits go
//! through the springs, twitch/tilt/heave are written straight into the
//! transient state because per-frame jitter through a spring would be damped
//! into invisibility.

use crate::constants::*;
use crate::mood::Expression;
use crate::targets::PoseTargets;
use crate::state::Viewport;
use glam::Vec2;
use rand::Rng;

/// How the generator wants body tilt handled this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TiltUpdate {
    Hold,
    Set(f32),
    Ease { target: f32, speed: f32 },
}

/// Target overrides and transient deltas produced by one generator step.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionOutput {
    /// Idle bob: `x` is horizontal sway, `y` vertical bob.
    pub bob: Vec2,
    pub twitch: [Vec2; 2],
    pub heave: f32,
    pub tilt: TiltUpdate,
    pub mouth_width_target: Option<f32>,
    pub mouth_curve_target: Option<f32>,
    pub squint_target: Option<f32>,
    /// Blink speed when the scheduler fired.
    pub blink: Option<f32>,
}

impl Default for MotionOutput {
    fn default() -> Self {
        Self {
            bob: Vec2::ZERO,
            twitch: [Vec2::ZERO; 2],
            heave: 0.0,
            tilt: TiltUpdate::Hold,
            mouth_width_target: None,
            mouth_curve_target: None,
            squint_target: None,
            blink: None,
        }
    }
}

/// Inputs every generator may read.
#[derive(Clone, Copy, Debug)]
pub struct MotionContext<'a> {
    pub now_ms: f64,
    pub dt: f32,
    pub viewport: Viewport,
    /// Targets the mapper last wrote; jitter is applied around these.
    pub base: &'a PoseTargets,
}

/// Phase accumulators and deadlines owned by the generators.
#[derive(Clone, Debug, Default)]
pub struct MotionState {
    idle_cycle: f32,
    float_time: f32,
    breath: f32,
    laugh_phase: f32,
    thinking_phase: f32,
    next_blink_at: f64,
    furrow_revert_at: Option<f64>,
}

impl MotionState {
    pub fn next_blink_at(&self) -> f64 {
        self.next_blink_at
    }

    pub fn furrow_revert_at(&self) -> Option<f64> {
        self.furrow_revert_at
    }

    pub fn breath(&self) -> f32 {
        self.breath
    }

    pub fn float_time(&self) -> f32 {
        self.float_time
    }

    pub fn laugh_phase(&self) -> f32 {
        self.laugh_phase
    }

    /// Drop any pending furrow revert; the mapper has rewritten the squint.
    pub fn cancel_furrow(&mut self) {
        self.furrow_revert_at = None;
    }

    /// Advance shared clocks and run the branch for `expression`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        expression: Expression,
        ctx: &MotionContext<'_>,
        rng: &mut R,
    ) -> MotionOutput {
        self.idle_cycle += ctx.dt;
        self.breath += 0.06 * ctx.dt * REFERENCE_FPS;
        self.float_time += ctx.dt * REFERENCE_FPS;

        let mut out = MotionOutput::default();
        self.expire_furrow(expression, ctx.now_ms, &mut out);

        match expression {
            Expression::Idle => self.idle(ctx, rng, &mut out),
            Expression::EvilLaugh | Expression::EvilLaughTwitch => {
                self.evil_laugh(expression == Expression::EvilLaughTwitch, ctx, rng, &mut out)
            }
            Expression::Pleading => self.pleading(&mut out),
            Expression::Thinking => self.thinking(ctx, rng, &mut out),
            _ => {
                out.tilt = TiltUpdate::Ease {
                    target: 0.0,
                    speed: 0.15,
                }
            }
        }
        out
    }

    fn expire_furrow(&mut self, expression: Expression, now_ms: f64, out: &mut MotionOutput) {
        if let Some(at) = self.furrow_revert_at {
            if now_ms >= at {
                self.furrow_revert_at = None;
                if expression == Expression::Thinking {
                    out.squint_target = Some(THINKING_SQUINT);
                }
            }
        }
    }

    fn idle<R: Rng + ?Sized>(&mut self, ctx: &MotionContext<'_>, rng: &mut R, out: &mut MotionOutput) {
        if ctx.now_ms > self.next_blink_at {
            let speed = if rng.gen::<f32>() > 0.7 {
                0.2
            } else {
                0.45 + rng.gen::<f32>() * 0.2
            };
            let gap = BLINK_GAP_MIN_MS + rng.gen::<f64>() * BLINK_GAP_SPAN_MS;
            self.next_blink_at = ctx.now_ms + gap;
            out.blink = Some(speed);
            log::trace!("[motion] idle blink speed={:.2} next in {:.0}ms", speed, gap);
        }

        let c = self.idle_cycle;
        let bob_freq = 1.3;
        let sway_freq = bob_freq * 0.5;
        let portrait = ctx.viewport.is_portrait();
        out.bob = Vec2::new(
            (c * sway_freq).cos() * if portrait { 14.0 } else { 18.0 },
            (c * bob_freq).sin() * if portrait { 18.0 } else { 22.0 },
        );

        let width_mod = (c * 0.7).sin() * 4.0 + (c * 1.5).sin() * 2.0;
        let curve_mod = (c * 1.1).cos() * 2.0 + (c * 0.3).sin() * 3.0;
        out.mouth_width_target = Some(ctx.base.mouth_width + width_mod);
        out.mouth_curve_target = Some(curve_mod);

        let sway = (c * 0.3).sin() * 0.04 + (c * 0.65).sin() * 0.02;
        out.tilt = TiltUpdate::Ease {
            target: sway + out.bob.x * 0.001,
            speed: 0.03,
        };
    }

    fn evil_laugh<R: Rng + ?Sized>(
        &mut self,
        twitching: bool,
        ctx: &MotionContext<'_>,
        rng: &mut R,
        out: &mut MotionOutput,
    ) {
        self.laugh_phase += ctx.dt * LAUGH_PHASE_RATE;
        if !twitching {
            return;
        }
        let mut jitter = |scale: f32| (rng.gen::<f32>() - 0.5) * scale;
        out.twitch = [
            Vec2::new(jitter(TWITCH_JITTER_PX), jitter(TWITCH_JITTER_PX)),
            Vec2::new(jitter(TWITCH_JITTER_PX), jitter(TWITCH_JITTER_PX)),
        ];
        out.heave = self.laugh_phase.sin().abs() * -LAUGH_HEAVE_PX;
        out.mouth_width_target = Some(ctx.base.mouth_width + jitter(15.0));
        out.mouth_curve_target = Some(ctx.base.mouth_curve + jitter(10.0));
        out.tilt = TiltUpdate::Set(jitter(0.12) + (self.laugh_phase * 0.2).sin() * 0.05);
    }

    fn pleading(&mut self, out: &mut MotionOutput) {
        let t = self.float_time;
        out.twitch = [
            Vec2::new((t * 0.2).sin() * 1.5, (t * 0.25).cos() * 1.5),
            Vec2::new((t * 0.22).sin() * 1.5, (t * 0.27).cos() * 1.5),
        ];
        out.tilt = TiltUpdate::Set((t * 0.05).sin() * 0.03);
    }

    fn thinking<R: Rng + ?Sized>(
        &mut self,
        ctx: &MotionContext<'_>,
        rng: &mut R,
        out: &mut MotionOutput,
    ) {
        self.thinking_phase += ctx.dt * 2.0;
        let p = self.thinking_phase;
        let look = (p * 0.7).sin();
        let up_down = (p * 1.3).sin() * 0.5;
        // Both eyes wander together.
        let gaze = Vec2::new(look * 3.0 + up_down, up_down * 2.0);
        out.twitch = [gaze, gaze];
        out.tilt = TiltUpdate::Set((p * 0.3).sin() * 0.02);

        if rng.gen::<f32>() > 1.0 - FURROW_CHANCE_PER_FRAME {
            out.squint_target = Some(0.4 + rng.gen::<f32>() * 0.2);
            self.furrow_revert_at = Some(
                ctx.now_ms + FURROW_REVERT_MIN_MS + rng.gen::<f64>() * FURROW_REVERT_SPAN_MS,
            );
        }
    }
}
