//! Canvas background fill.

use resvg::tiny_skia::{
    FillRule, GradientStop, LinearGradient, Paint, Pixmap, Point, Shader, SpreadMode, Transform,
};

use super::raster::rounded_rect_path;
use super::{LayerEffect, RenderContext};
use crate::layout::CanvasFrame;
use crate::settings::ResolvedFill;

/// The painted background, before anything else touches the canvas.
///
/// Emitted only when the glass halo is on, since it refracts a blurred
/// copy of it.
pub struct BackgroundFill(pub Pixmap);

/// Fills the canvas with the solid or gradient background.
///
/// Gradients run corner to corner across the whole canvas regardless of
/// where the object sits. With outer roundness the fill is clipped to a
/// rounded rect spanning the canvas, leaving transparent corners.
pub struct BackgroundLayer;

impl LayerEffect for BackgroundLayer {
    fn paint(&self, ctx: &mut RenderContext) {
        paint_background(&mut ctx.canvas, &ctx.frame, ctx.settings.background.resolve());
    }

    fn emit(&self, ctx: &mut RenderContext) {
        if !ctx.settings.glass_enabled {
            return;
        }
        let fill = BackgroundFill(ctx.canvas.clone());
        ctx.set(fill);
    }
}

fn background_shader(frame: &CanvasFrame, fill: ResolvedFill) -> Shader<'static> {
    match fill {
        ResolvedFill::Solid(color) => Shader::SolidColor(color.to_skia(1.0)),
        ResolvedFill::Gradient(from, to) => LinearGradient::new(
            Point::from_xy(0.0, 0.0),
            Point::from_xy(frame.final_width, frame.final_height),
            vec![
                GradientStop::new(0.0, from.to_skia(1.0)),
                GradientStop::new(1.0, to.to_skia(1.0)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .unwrap_or(Shader::SolidColor(from.to_skia(1.0))),
    }
}

/// Paints the background onto `canvas`.
pub fn paint_background(canvas: &mut Pixmap, frame: &CanvasFrame, fill: ResolvedFill) {
    let Some(path) = rounded_rect_path(frame.canvas_rect(), frame.outer_radius) else {
        return;
    };

    let mut paint = Paint::default();
    paint.shader = background_shader(frame, fill);
    paint.anti_alias = true;

    canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::resolve;
    use crate::settings::{BackgroundSpec, HexColor, RenderSettings};
    use crate::source::SizePx;

    fn frame(outer_roundness: f32) -> CanvasFrame {
        let settings = RenderSettings {
            padding: 20.0,
            outer_roundness,
            ..RenderSettings::default()
        };
        resolve(SizePx::new(80, 60), &settings)
    }

    fn canvas_for(frame: &CanvasFrame) -> Pixmap {
        let size = frame.pixel_size();
        Pixmap::new(size.width, size.height).unwrap()
    }

    #[test]
    fn solid_fills_every_pixel() {
        let frame = frame(0.0);
        let mut canvas = canvas_for(&frame);
        paint_background(&mut canvas, &frame, ResolvedFill::Solid(HexColor::rgb(0x336699)));

        let corner = canvas.pixel(0, 0).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue(), corner.alpha()), (0x33, 0x66, 0x99, 255));
        let far = canvas.pixel(canvas.width() - 1, canvas.height() - 1).unwrap();
        assert_eq!(far.alpha(), 255);
    }

    #[test]
    fn gradient_runs_corner_to_corner() {
        let frame = frame(0.0);
        let mut canvas = canvas_for(&frame);
        let spec = BackgroundSpec::Gradient {
            from: HexColor::BLACK,
            to: HexColor::WHITE,
        };
        paint_background(&mut canvas, &frame, spec.resolve());

        let start = canvas.pixel(0, 0).unwrap();
        let end = canvas.pixel(canvas.width() - 1, canvas.height() - 1).unwrap();
        assert!(start.red() < 20);
        assert!(end.red() > 235);
    }

    #[test]
    fn outer_roundness_leaves_transparent_corners() {
        let frame = frame(60.0);
        assert!(frame.outer_radius > 0.0);
        let mut canvas = canvas_for(&frame);
        paint_background(&mut canvas, &frame, ResolvedFill::Solid(HexColor::WHITE));

        assert_eq!(canvas.pixel(0, 0).unwrap().alpha(), 0);
        let (cx, cy) = (canvas.width() / 2, canvas.height() / 2);
        assert_eq!(canvas.pixel(cx, cy).unwrap().alpha(), 255);
    }
}
