//! The object itself: the image inside a rounded frame, with optional
//! window chrome.

use resvg::tiny_skia::{FilterQuality, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};

use super::raster::{clip_mask, fill_color, rounded_rect_path};
use super::{LayerEffect, RenderContext};
use crate::layout::CanvasFrame;
use crate::settings::HexColor;

/// Title bar fill.
pub const CHROME_BAR_COLOR: HexColor = HexColor::rgb(0x1e1e1e);

/// Close, minimize and zoom buttons, left to right.
pub const TRAFFIC_LIGHTS: [HexColor; 3] = [
    HexColor::rgb(0xff5f56),
    HexColor::rgb(0xffbd2e),
    HexColor::rgb(0x27c93f),
];

/// Draws the framed image on top of everything but the text.
pub struct FrameLayer;

impl LayerEffect for FrameLayer {
    fn paint(&self, ctx: &mut RenderContext) {
        draw_frame(&mut ctx.canvas, &ctx.frame, ctx.source, Transform::identity());
    }
}

/// Centres of the three title bar buttons and their shared radius.
///
/// Buttons are spaced 60% of the bar height apart starting one gap in from
/// the left edge, each with a radius of 18% of the bar height.
pub fn traffic_light_geometry(frame: &CanvasFrame) -> ([(f32, f32); 3], f32) {
    let bar = frame.chrome_height;
    let gap = bar * 0.6;
    let cy = frame.object.y + bar / 2.0;
    let centers = std::array::from_fn(|i| (frame.object.x + gap * (i as f32 + 1.0), cy));
    (centers, bar * 0.18)
}

/// Draws the object into `target` through `transform`.
///
/// Everything is clipped to the object's rounded rect. The reflection
/// stage reuses this with a flipping transform.
pub fn draw_frame(target: &mut Pixmap, frame: &CanvasFrame, source: &Pixmap, transform: Transform) {
    let Some(outline) = rounded_rect_path(frame.object, frame.corner_radius) else {
        return;
    };
    let mask = clip_mask(target.width(), target.height(), &outline, transform);

    if frame.chrome_height > 0.0 {
        let object = frame.object;
        if let Some(bar) = Rect::from_xywh(object.x, object.y, object.width, frame.chrome_height) {
            let bar = PathBuilder::from_rect(bar);
            fill_color(target, &bar, CHROME_BAR_COLOR.to_skia(1.0), transform, mask.as_ref());
        }

        let (centers, radius) = traffic_light_geometry(frame);
        for ((cx, cy), color) in centers.into_iter().zip(TRAFFIC_LIGHTS) {
            if let Some(dot) = PathBuilder::from_circle(cx, cy, radius) {
                fill_color(target, &dot, color.to_skia(1.0), transform, mask.as_ref());
            }
        }
    }

    let area = frame.image_rect();
    if source.width() == 0 || source.height() == 0 || area.width <= 0.0 || area.height <= 0.0 {
        return;
    }
    let scale_x = area.width / source.width() as f32;
    let scale_y = area.height / source.height() as f32;
    let image_transform = transform
        .pre_translate(area.x, area.y)
        .pre_scale(scale_x, scale_y);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    target.draw_pixmap(0, 0, source.as_ref(), &paint, image_transform, mask.as_ref());
}
