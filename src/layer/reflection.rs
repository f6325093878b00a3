//! Mirrored, fading reflection beneath the object.

use resvg::tiny_skia::{
    BlendMode, Color, GradientStop, LinearGradient, Paint, Pixmap, PixmapPaint, Point, Rect,
    SpreadMode, Transform,
};

use super::frame::draw_frame;
use super::{LayerEffect, RenderContext};
use crate::error::MockupError;
use crate::layout::CanvasFrame;

/// Space between the object's bottom edge and the top of its reflection.
pub const REFLECTION_GAP: f32 = 2.0;

/// Fraction of the object height over which the reflection fades out.
pub const REFLECTION_FADE: f32 = 0.35;

/// Draws a vertically mirrored copy of the frame below it.
///
/// The mirrored frame goes into its own buffer first. The fade is applied
/// there with destination-in compositing, which would otherwise erase the
/// background already on the canvas.
pub struct ReflectionLayer;

impl LayerEffect for ReflectionLayer {
    fn is_active(&self, ctx: &RenderContext) -> bool {
        ctx.settings.reflection_intensity > 0.0
    }

    fn paint(&self, ctx: &mut RenderContext) {
        let (width, height) = (ctx.canvas.width(), ctx.canvas.height());
        let Some(reflection) = render_reflection(
            &ctx.frame,
            ctx.source,
            ctx.settings.reflection_intensity,
            width,
            height,
        ) else {
            let err = MockupError::offscreen(width, height);
            tracing::warn!(%err, "skipping reflection");
            return;
        };

        ctx.canvas.draw_pixmap(
            0,
            0,
            reflection.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// Flip about the horizontal line just below the object.
pub fn reflection_transform(frame: &CanvasFrame) -> Transform {
    let axis = frame.object.bottom();
    Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, axis * 2.0 + REFLECTION_GAP)
}

/// Renders the faded reflection into a transparent canvas-sized buffer.
///
/// Opacity starts at `intensity / 100 * 0.5` at the top of the reflection
/// and reaches zero [`REFLECTION_FADE`] of the object height further down.
/// Returns `None` if the buffer or the fade cannot be created.
pub fn render_reflection(
    frame: &CanvasFrame,
    source: &Pixmap,
    intensity: f32,
    width: u32,
    height: u32,
) -> Option<Pixmap> {
    let mut buffer = Pixmap::new(width, height)?;
    draw_frame(&mut buffer, frame, source, reflection_transform(frame));

    let top = frame.object.bottom() + REFLECTION_GAP;
    let start_alpha = (intensity.clamp(0.0, 100.0) / 100.0) * 0.5;
    let fade = LinearGradient::new(
        Point::from_xy(0.0, top),
        Point::from_xy(0.0, top + frame.object.height * REFLECTION_FADE),
        vec![
            GradientStop::new(0.0, Color::from_rgba(0.0, 0.0, 0.0, start_alpha)?),
            GradientStop::new(1.0, Color::TRANSPARENT),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )?;

    let mut paint = Paint::default();
    paint.shader = fade;
    paint.blend_mode = BlendMode::DestinationIn;
    let bounds = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)?;
    buffer.fill_rect(bounds, &paint, Transform::identity(), None);

    Some(buffer)
}
