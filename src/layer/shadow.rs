//! Drop shadow beneath the object.

use resvg::tiny_skia::{Color, Transform};

use super::raster::{ShadowStyle, cast_shadow, fill_color, rounded_rect_path};
use super::{LayerEffect, RenderContext};
use crate::layout::CanvasFrame;
use crate::settings::HexColor;

/// Casts a soft shadow from the object's outline.
///
/// The caster itself is filled solid black; the frame stage paints over it
/// straight away so only the shadow stays visible.
pub struct ShadowLayer;

impl LayerEffect for ShadowLayer {
    fn is_active(&self, ctx: &RenderContext) -> bool {
        ctx.settings.shadow_intensity > 0.0
    }

    fn paint(&self, ctx: &mut RenderContext) {
        let Some(outline) = rounded_rect_path(ctx.frame.object, ctx.frame.corner_radius) else {
            return;
        };

        let style = shadow_style(&ctx.frame, ctx.settings.shadow_intensity, ctx.settings.shadow_color);
        cast_shadow(&mut ctx.canvas, &outline, Transform::identity(), &style);
        fill_color(&mut ctx.canvas, &outline, Color::BLACK, Transform::identity(), None);
    }
}

/// Shadow blur and drop grow with intensity and image width.
pub fn shadow_style(frame: &CanvasFrame, intensity: f32, color: HexColor) -> ShadowStyle {
    let strength = frame.per_mille(intensity);
    ShadowStyle {
        blur: strength * 2.0,
        offset_x: 0.0,
        offset_y: strength * 0.8,
        color: color.to_skia(0.6),
    }
}
