use glam::Vec2;
use mochi_core::{Blend, Color, Surface, Viewport};
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys as web;

/// [`Surface`] backed by a canvas 2D context. Drawing errors from the
/// context are cosmetic and dropped.
pub struct CanvasSurface {
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("canvas has no 2d context"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        ctx.set_line_cap("round");
        Ok(Self { ctx })
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, viewport: Viewport) {
        _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_global_alpha(1.0);
        _ = self.ctx.set_global_composite_operation("source-over");
        self.ctx
            .clear_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        _ = self.ctx.translate(offset.x as f64, offset.y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        _ = self.ctx.rotate(radians as f64);
    }

    fn scale(&mut self, factor: Vec2) {
        _ = self.ctx.scale(factor.x as f64, factor.y as f64);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_blend(&mut self, blend: Blend) {
        let op = match blend {
            Blend::SourceOver => "source-over",
            Blend::Screen => "screen",
        };
        _ = self.ctx.set_global_composite_operation(op);
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.ctx.set_shadow_blur(blur as f64);
        self.ctx.set_shadow_color(&color.to_css());
    }

    fn radial_glow(&mut self, viewport: Viewport, center: Vec2, radius: f32, color: Color) {
        let (x, y) = (center.x as f64, center.y as f64);
        let Ok(gradient) = self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, radius as f64)
        else {
            return;
        };
        _ = gradient.add_color_stop(0.0, &color.to_css());
        _ = gradient.add_color_stop(1.0, &Color::TRANSPARENT.to_css());
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx
            .fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        _ = self.ctx.ellipse(
            center.x as f64,
            center.y as f64,
            radii.x.max(0.0) as f64,
            radii.y.max(0.0) as f64,
            0.0,
            0.0,
            TAU,
        );
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn stroke_quadratic(&mut self, from: Vec2, control: Vec2, to: Vec2, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.quadratic_curve_to(
            control.x as f64,
            control.y as f64,
            to.x as f64,
            to.y as f64,
        );
        self.ctx.stroke();
    }

    fn fill_tongue(&mut self, width: f32, length: f32, corner_radius: f32, color: Color) {
        let half = width as f64 * 0.5;
        let len = length as f64;
        let r = (corner_radius as f64).min(half).min(len).max(0.0);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx.move_to(-half, 0.0);
        self.ctx.line_to(half, 0.0);
        self.ctx.line_to(half, len - r);
        self.ctx.quadratic_curve_to(half, len, half - r, len);
        self.ctx.line_to(-half + r, len);
        self.ctx.quadratic_curve_to(-half, len, -half, len - r);
        self.ctx.close_path();
        self.ctx.fill();
    }
}
