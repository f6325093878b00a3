//! Frosted-glass halo around the object.

use resvg::tiny_skia::{Color, FilterQuality, Paint, Pixmap, PixmapPaint, Stroke, Transform};

use super::background::{BackgroundFill, paint_background};
use super::raster::{ShadowStyle, cast_shadow, clip_mask, fill_color, gaussian_blur, rounded_rect_path};
use super::{LayerEffect, RenderContext};
use crate::error::MockupError;
use crate::layout::CanvasFrame;
use crate::source::RectF;

/// Blur applied to the refracted background.
const REFRACTION_BLUR: f32 = 20.0;
/// Zoom of the refracted background.
const REFRACTION_SCALE: f32 = 1.1;
/// Shift of the refracted background, as a fraction of the canvas size.
const REFRACTION_SHIFT: f32 = -0.05;

/// A blurred, translucent rounded pane the object sits inside.
///
/// Drawn after the background and reflection but before the shadow and
/// frame. The pane shows a zoomed, blurred copy of the background under a
/// white tint, edged with a thin highlight and lifted by a soft shadow.
pub struct GlassLayer;

impl LayerEffect for GlassLayer {
    fn is_active(&self, ctx: &RenderContext) -> bool {
        ctx.settings.glass_enabled
    }

    fn paint(&self, ctx: &mut RenderContext) {
        let frame = ctx.frame;
        let (bounds, radius) = halo_bounds(&frame, ctx.settings.glass_spread);
        let Some(pane) = rounded_rect_path(bounds, radius) else {
            return;
        };

        let mut refracted = match ctx.get::<BackgroundFill>() {
            Some(BackgroundFill(fill)) => Some(fill.clone()),
            None => Pixmap::new(ctx.canvas.width(), ctx.canvas.height()).map(|mut p| {
                paint_background(&mut p, &frame, ctx.settings.background.resolve());
                p
            }),
        };

        let lift = ShadowStyle {
            blur: 30.0,
            offset_x: 0.0,
            offset_y: 15.0,
            color: Color::from_rgba8(0, 0, 0, 26),
        };
        cast_shadow(&mut ctx.canvas, &pane, Transform::identity(), &lift);

        let canvas = &mut ctx.canvas;
        match refracted.as_mut() {
            Some(background) => {
                gaussian_blur(background, REFRACTION_BLUR);
                let zoom = Transform::from_row(
                    REFRACTION_SCALE,
                    0.0,
                    0.0,
                    REFRACTION_SCALE,
                    frame.final_width * REFRACTION_SHIFT,
                    frame.final_height * REFRACTION_SHIFT,
                );
                let mask = clip_mask(canvas.width(), canvas.height(), &pane, Transform::identity());
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                canvas.draw_pixmap(0, 0, background.as_ref(), &paint, zoom, mask.as_ref());
            }
            None => {
                let err = MockupError::offscreen(canvas.width(), canvas.height());
                tracing::warn!(%err, "drawing glass tint without refraction");
            }
        }

        fill_color(canvas, &pane, Color::from_rgba8(255, 255, 255, 64), Transform::identity(), None);

        let mut edge = Paint::default();
        edge.set_color(Color::from_rgba8(255, 255, 255, 128));
        edge.anti_alias = true;
        let stroke = Stroke {
            width: 1.5,
            ..Stroke::default()
        };
        canvas.stroke_path(&pane, &edge, &stroke, Transform::identity(), None);
    }
}

/// Bounds and corner radius of the glass pane.
pub fn halo_bounds(frame: &CanvasFrame, spread: f32) -> (RectF, f32) {
    let distance = spread.max(0.0) * (frame.img_width / 1000.0);
    let bounds = frame.object.expand(distance);
    let radius = (frame.corner_radius * 1.5).min(frame.max_radius());
    (bounds, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{BackgroundLayer, apply};
    use crate::layout::resolve;
    use crate::settings::{BackgroundSpec, HexColor, RenderSettings};
    use crate::source::SizePx;

    #[test]
    fn halo_expands_by_relative_spread() {
        let settings = RenderSettings {
            padding: 100.0,
            inner_roundness: 20.0,
            ..RenderSettings::default()
        };
        let frame = resolve(SizePx::new(500, 400), &settings);
        let (bounds, radius) = halo_bounds(&frame, 40.0);

        // 40 * (500 / 1000) = 20
        assert!((frame.object.x - bounds.x - 20.0).abs() < 1e-3);
        assert!((bounds.width - frame.object.width - 40.0).abs() < 1e-3);
        assert!((radius - frame.corner_radius * 1.5).abs() < 1e-3);
    }

    #[test]
    fn pane_brightens_a_dark_background() {
        let settings = RenderSettings {
            padding: 100.0,
            glass_enabled: true,
            glass_spread: 100.0,
            shadow_intensity: 0.0,
            background: BackgroundSpec::Solid { color: HexColor::BLACK },
            ..RenderSettings::default()
        };
        let frame = resolve(SizePx::new(100, 80), &settings);
        let size = frame.pixel_size();
        let canvas = Pixmap::new(size.width, size.height).unwrap();
        let source = Pixmap::new(100, 80).unwrap();

        let mut ctx = RenderContext::new(canvas, frame, &settings, &source);
        apply(&BackgroundLayer, &mut ctx);
        apply(&GlassLayer, &mut ctx);
        let canvas = ctx.into_canvas();

        let (bounds, _) = halo_bounds(&frame, 100.0);
        let inside = canvas.pixel((bounds.x + 3.0) as u32, (bounds.y + bounds.height / 2.0) as u32).unwrap();
        assert!(inside.red() > 40, "tinted pane expected, got {}", inside.red());

        let outside = canvas.pixel(1, 1).unwrap();
        assert!(outside.red() < 5);
    }
}
