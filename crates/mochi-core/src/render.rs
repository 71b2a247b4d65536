//! 2D compositing of one frame onto an abstract raster surface.
//!
//! The pass order is fixed: clear, background glow, audio visualizer, face
//! (one or three colour-offset copies under a soft glow), scanlines.
//! [`Surface`] mirrors the subset of a canvas-2D context the passes need so
//! the whole pipeline can run against a recording surface in tests.

use crate::constants::*;
use crate::dance::DancePose;
use crate::face::FaceGeometry;
use crate::mood::{Expression, Mode};
use crate::state::{Color, LoopPhase, Viewport};
use glam::Vec2;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    SourceOver,
    Screen,
}

/// Immediate-mode drawing target. Transform calls compose with the current
/// transform; `save`/`restore` push and pop transform, alpha, blend and
/// shadow state.
pub trait Surface {
    fn clear(&mut self, viewport: Viewport);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: Vec2);
    fn set_alpha(&mut self, alpha: f32);
    fn set_blend(&mut self, blend: Blend);
    fn set_shadow(&mut self, blur: f32, color: Color);
    /// Fill the whole viewport with a radial gradient from `color` to transparent.
    fn radial_glow(&mut self, viewport: Viewport, center: Vec2, radius: f32, color: Color);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, width: f32, color: Color);
    /// Rectangle hanging down from the origin, lower corners rounded.
    fn fill_tongue(&mut self, width: f32, length: f32, corner_radius: f32, color: Color);
}

/// Everything the compositor reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub viewport: Viewport,
    pub phase: LoopPhase,
    pub expression: Expression,
    pub mode: Mode,
    /// Face origin in surface pixels.
    pub center: Vec2,
    pub tilt: f32,
    pub dance: DancePose,
    pub chromatic_offset: f32,
    pub disco_color: usize,
    /// Current eye-size spring value; scales the visualizer ring.
    pub eye_size: f32,
    pub visualizer: &'a [u8],
    pub geometry: FaceGeometry,
}

impl Frame<'_> {
    pub fn disco_color(&self) -> Color {
        DISCO_COLORS[self.disco_color % DISCO_COLORS.len()]
    }

    fn hot(&self) -> bool {
        self.mode == Mode::Phonk || self.expression == Expression::EvilLaughTwitch
    }

    /// Face colour passes and their horizontal offsets.
    pub fn face_passes(&self) -> FacePasses {
        let off = self.chromatic_offset;
        if off > CHROMATIC_TRIPLE_PASS_THRESHOLD {
            FacePasses::Triple([
                (CHROMA_LEFT, -off),
                (CHROMA_CENTER, 0.0),
                (CHROMA_RIGHT, off),
            ])
        } else {
            FacePasses::Single(WHITE)
        }
    }

    pub fn glow_blur(&self) -> f32 {
        if self.viewport.is_portrait() {
            return BASE_GLOW_BLUR;
        }
        let mut blur = BASE_GLOW_BLUR;
        if self.mode.is_special() {
            blur += SPECIAL_MODE_GLOW_BLUR;
        }
        if self.expression == Expression::EvilLaughTwitch {
            blur += TWITCH_GLOW_BLUR;
        }
        blur
    }

    pub fn glow_color(&self) -> Color {
        if self.expression.is_evil_laugh() {
            HOT_PINK
        } else {
            match self.mode {
                Mode::Phonk => RED,
                Mode::Disco => self.disco_color(),
                Mode::Normal => WHITE,
            }
        }
    }

    /// Radial background gradient: `(radius, inner colour)`.
    pub fn background(&self) -> Option<(f32, Color)> {
        let w = self.viewport.width;
        if self.mode == Mode::Disco {
            let radius = w * self.viewport.pick((1.0, 0.7));
            return Some((radius, self.disco_color().with_alpha(DISCO_GLOW_ALPHA)));
        }
        if !self.hot() {
            return None;
        }
        let color = if self.expression.is_evil_laugh() {
            LAUGH_GLOW
        } else if self.mode == Mode::Phonk {
            PHONK_GLOW
        } else {
            Color::TRANSPARENT
        };
        Some((w * self.viewport.pick((0.8, 0.5)), color))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FacePasses {
    Single(Color),
    Triple([(Color, f32); 3]),
}

/// Composite one frame. Booting frames are dimmed and skip the visualizer.
pub fn render_frame(surface: &mut dyn Surface, frame: &Frame<'_>) {
    let booting = frame.phase == LoopPhase::Booting;
    surface.clear(frame.viewport);

    if let Some((radius, color)) = frame.background() {
        if !color.is_transparent() {
            surface.radial_glow(frame.viewport, frame.center, radius, color);
        }
    }

    if !booting {
        draw_visualizer(surface, frame);
    }

    let alpha = if booting { BOOT_DIM_ALPHA } else { 1.0 };
    surface.save();
    surface.set_shadow(frame.glow_blur(), frame.glow_color());
    match frame.face_passes() {
        FacePasses::Single(color) => draw_face(surface, frame, color, 0.0, alpha),
        FacePasses::Triple(passes) => {
            surface.set_blend(Blend::Screen);
            for (color, dx) in passes {
                draw_face(surface, frame, color, dx, alpha);
            }
        }
    }
    surface.restore();

    draw_scanlines(surface, frame);
}

fn draw_visualizer(surface: &mut dyn Surface, frame: &Frame<'_>) {
    let bins = frame.visualizer;
    if bins.is_empty() {
        return;
    }
    let radius = frame.eye_size * frame.viewport.pick(VISUALIZER_RADIUS_TO_EYE);
    let color = match frame.mode {
        Mode::Phonk => HOT_PINK,
        Mode::Disco => frame.disco_color(),
        Mode::Normal => WHITE,
    };
    let width = if frame.mode == Mode::Phonk { 3.0 } else { 2.0 };
    let step = TAU / bins.len() as f32;
    let start = radius * 1.2;

    surface.save();
    surface.translate(frame.center);
    surface.rotate(frame.tilt);
    surface.set_alpha(VISUALIZER_ALPHA);
    for (i, bin) in bins.iter().enumerate() {
        let dir = Vec2::from_angle(i as f32 * step);
        let end = start + (*bin as f32 / 255.0) * radius * 0.8;
        surface.stroke_line(dir * start, dir * end, width, color);
    }
    surface.restore();
}

fn draw_face(surface: &mut dyn Surface, frame: &Frame<'_>, color: Color, dx: f32, alpha: f32) {
    let geo = &frame.geometry;
    surface.save();
    surface.set_alpha(alpha);
    surface.translate(frame.center + Vec2::new(dx, 0.0));
    surface.rotate(frame.tilt + frame.dance.rotation);

    for eye in &geo.eyes {
        surface.save();
        surface.translate(eye.center);
        surface.rotate(eye.angle);
        surface.scale(eye.scale);
        surface.fill_ellipse(Vec2::ZERO, Vec2::new(eye.radius_x, eye.radius_y), color);
        surface.restore();
    }

    let mouth = &geo.mouth;
    surface.stroke_quadratic(mouth.left, mouth.control, mouth.right, FACE_LINE_WIDTH, color);

    if let Some(tongue) = &geo.tongue {
        surface.save();
        surface.translate(tongue.anchor);
        surface.rotate(tongue.rotation);
        surface.fill_tongue(tongue.width, tongue.length, tongue.corner_radius, color);
        surface.restore();
    }
    surface.restore();
}

fn draw_scanlines(surface: &mut dyn Surface, frame: &Frame<'_>) {
    let (alpha, color) = if frame.hot() {
        (SCANLINE_ALPHA_HOT, HOT_PINK)
    } else {
        (SCANLINE_ALPHA, WHITE)
    };
    let spacing = frame.viewport.pick(SCANLINE_SPACING_PX);
    let size = Vec2::new(frame.viewport.width, SCANLINE_HEIGHT_PX);
    surface.save();
    surface.set_alpha(alpha);
    let mut y = 0.0;
    while y < frame.viewport.height {
        surface.fill_rect(Vec2::new(0.0, y), size, color);
        y += spacing;
    }
    surface.restore();
}

/// Surface that records every call; used by host-side tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear,
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(Vec2),
    Alpha(f32),
    Blend(Blend),
    Shadow { blur: f32, color: Color },
    Glow { radius: f32, color: Color },
    Rect { origin: Vec2, size: Vec2, color: Color },
    Ellipse { radii: Vec2, color: Color },
    Line { from: Vec2, to: Vec2, width: f32, color: Color },
    Quadratic { from: Vec2, control: Vec2, to: Vec2, color: Color },
    Tongue { width: f32, length: f32, color: Color },
}

impl RecordingSurface {
    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, _viewport: Viewport) {
        self.calls.push(DrawCall::Clear);
    }
    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }
    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }
    fn translate(&mut self, offset: Vec2) {
        self.calls.push(DrawCall::Translate(offset));
    }
    fn rotate(&mut self, radians: f32) {
        self.calls.push(DrawCall::Rotate(radians));
    }
    fn scale(&mut self, factor: Vec2) {
        self.calls.push(DrawCall::Scale(factor));
    }
    fn set_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::Alpha(alpha));
    }
    fn set_blend(&mut self, blend: Blend) {
        self.calls.push(DrawCall::Blend(blend));
    }
    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.calls.push(DrawCall::Shadow { blur, color });
    }
    fn radial_glow(&mut self, _viewport: Viewport, _center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::Glow { radius, color });
    }
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.calls.push(DrawCall::Rect {
            origin,
            size,
            color,
        });
    }
    fn fill_ellipse(&mut self, _center: Vec2, radii: Vec2, color: Color) {
        self.calls.push(DrawCall::Ellipse { radii, color });
    }
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.calls.push(DrawCall::Line {
            from,
            to,
            width,
            color,
        });
    }
    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, _width: f32, color: Color) {
        self.calls.push(DrawCall::Quadratic {
            from,
            control,
            to,
            color,
        });
    }
    fn fill_tongue(&mut self, width: f32, length: f32, _corner_radius: f32, color: Color) {
        self.calls.push(DrawCall::Tongue {
            width,
            length,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFrame;
    use crate::spring::SpringField;
    use crate::state::TransientState;

    fn frame(mode: Mode, expression: Expression, chroma: f32, bins: &[u8]) -> Frame<'_> {
        let geometry = FaceGeometry::solve(
            &SpringField::default(),
            &TransientState::default(),
            &AudioFrame::default(),
            1.0,
            false,
        );
        Frame {
            viewport: Viewport::new(1280.0, 720.0),
            phase: LoopPhase::Running,
            expression,
            mode,
            center: Vec2::new(640.0, 360.0),
            tilt: 0.0,
            dance: DancePose::default(),
            chromatic_offset: chroma,
            disco_color: 2,
            eye_size: 40.0,
            visualizer: bins,
            geometry,
        }
    }

    fn is_ellipse(c: &DrawCall) -> bool {
        matches!(c, DrawCall::Ellipse { .. })
    }

    #[test]
    fn single_pass_below_threshold() {
        let f = frame(Mode::Normal, Expression::Idle, 0.1, &[]);
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        assert_eq!(s.count(is_ellipse), 2);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Blend(Blend::Screen))), 0);
        assert!(s.calls.contains(&DrawCall::Ellipse {
            radii: Vec2::new(20.0, 20.0),
            color: WHITE
        }));
    }

    #[test]
    fn triple_pass_above_threshold() {
        let f = frame(Mode::Normal, Expression::Idle, 1.0, &[]);
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        assert_eq!(s.count(is_ellipse), 6);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Quadratic { .. })), 3);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Blend(Blend::Screen))), 1);
        for color in [CHROMA_LEFT, CHROMA_CENTER, CHROMA_RIGHT] {
            assert!(s.count(|c| matches!(c, DrawCall::Ellipse { color: k, .. } if *k == color)) == 2);
        }
    }

    #[test]
    fn threshold_is_exclusive() {
        let f = frame(Mode::Normal, Expression::Idle, CHROMATIC_TRIPLE_PASS_THRESHOLD, &[]);
        assert!(matches!(f.face_passes(), FacePasses::Single(c) if c == WHITE));
    }

    #[test]
    fn visualizer_draws_one_ray_per_bin() {
        let bins = [128u8; 64];
        let f = frame(Mode::Phonk, Expression::Idle, 0.0, &bins);
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        let rays = s.count(|c| matches!(c, DrawCall::Line { width, color, .. } if *width == 3.0 && *color == HOT_PINK));
        assert_eq!(rays, 64);
    }

    #[test]
    fn empty_spectrum_draws_no_rays() {
        let f = frame(Mode::Normal, Expression::Idle, 0.0, &[]);
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Line { .. })), 0);
    }

    #[test]
    fn background_follows_mode() {
        assert!(frame(Mode::Normal, Expression::Idle, 0.0, &[]).background().is_none());
        let (radius, color) = frame(Mode::Disco, Expression::Idle, 0.0, &[])
            .background()
            .unwrap();
        assert!((radius - 1280.0 * 0.7).abs() < 1e-3);
        assert_eq!(color, DISCO_COLORS[2].with_alpha(DISCO_GLOW_ALPHA));
        let (_, phonk) = frame(Mode::Phonk, Expression::Idle, 0.0, &[])
            .background()
            .unwrap();
        assert_eq!(phonk, PHONK_GLOW);
        let (_, laugh) = frame(Mode::Normal, Expression::EvilLaughTwitch, 0.0, &[])
            .background()
            .unwrap();
        assert_eq!(laugh, LAUGH_GLOW);
    }

    #[test]
    fn glow_blur_stacks_in_landscape() {
        let f = frame(Mode::Phonk, Expression::EvilLaughTwitch, 0.0, &[]);
        assert_eq!(f.glow_blur(), 80.0);
        assert_eq!(f.glow_color(), HOT_PINK);
        let mut portrait = f;
        portrait.viewport = Viewport::new(400.0, 800.0);
        assert_eq!(portrait.glow_blur(), 25.0);
    }

    #[test]
    fn booting_is_dimmed_without_visualizer() {
        let bins = [255u8; 16];
        let mut f = frame(Mode::Normal, Expression::Sleepy, 0.0, &bins);
        f.phase = LoopPhase::Booting;
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Line { .. })), 0);
        assert!(s.calls.contains(&DrawCall::Alpha(BOOT_DIM_ALPHA)));
        assert_eq!(s.count(is_ellipse), 2);
    }

    #[test]
    fn scanlines_cover_the_viewport() {
        let f = frame(Mode::Normal, Expression::Idle, 0.0, &[]);
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &f);
        assert_eq!(s.count(|c| matches!(c, DrawCall::Rect { .. })), 90);
        assert!(s.calls.contains(&DrawCall::Alpha(SCANLINE_ALPHA)));
    }

    #[test]
    fn save_and_restore_balance() {
        let bins = [10u8; 8];
        let mut geo_frame = frame(Mode::Disco, Expression::Yum, 2.0, &bins);
        let mut springs = SpringField::default();
        springs.tongue.value = 1.0;
        geo_frame.geometry = FaceGeometry::solve(
            &springs,
            &TransientState::default(),
            &AudioFrame::default(),
            1.0,
            true,
        );
        let mut s = RecordingSurface::default();
        render_frame(&mut s, &geo_frame);
        assert_eq!(
            s.count(|c| *c == DrawCall::Save),
            s.count(|c| *c == DrawCall::Restore)
        );
        assert_eq!(s.count(|c| matches!(c, DrawCall::Tongue { .. })), 3);
    }
}
