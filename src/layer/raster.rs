//! Raster utilities shared by the draw stages.
//!
//! Everything draws on premultiplied tiny-skia pixmaps. This module holds
//! the pieces several stages need: the rounded-rect path, clip masks,
//! blur, cast shadows, and conversion to and from `image` buffers.

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{
    Color, ColorU8, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};

use crate::error::MockupError;
use crate::source::RectF;

// ============================================================================
// Paths and clipping
// ============================================================================

/// Bezier control distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Builds a rounded-rect path, falling back to a plain rectangle.
///
/// The radius is limited to half the shorter side. If the rounded outline
/// cannot be built the plain rectangle is returned instead, so callers never
/// have to handle a missing clip. Returns `None` only for degenerate rects.
pub fn rounded_rect_path(rect: RectF, radius: f32) -> Option<Path> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let radius = radius.min(rect.width.min(rect.height) / 2.0).max(0.0);
    if radius > 0.0 {
        if let Some(path) = build_rounded(rect, radius) {
            return Some(path);
        }
        tracing::debug!(?rect, radius, "rounded rect unavailable, using plain rect");
    }
    let bounds = Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)?;
    Some(PathBuilder::from_rect(bounds))
}

fn build_rounded(rect: RectF, r: f32) -> Option<Path> {
    let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.cubic_to(right - r + k, top, right, top + r - k, right, top + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.cubic_to(left + r - k, bottom, left, bottom - r + k, left, bottom - r);
    pb.line_to(left, top + r);
    pb.cubic_to(left, top + r - k, left + r - k, top, left + r, top);
    pb.close();
    pb.finish()
}

/// Rasterizes a path into an anti-aliased clip mask of the given size.
pub fn clip_mask(width: u32, height: u32, path: &Path, transform: Transform) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(path, FillRule::Winding, true, transform);
    Some(mask)
}

/// Fills a path with a flat colour.
pub fn fill_color(
    target: &mut Pixmap,
    path: &Path,
    color: Color,
    transform: Transform,
    mask: Option<&Mask>,
) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    target.fill_path(path, &paint, FillRule::Winding, transform, mask);
}

// ============================================================================
// Blur and shadows
// ============================================================================

/// Approximates a gaussian blur of standard deviation `sigma` in place.
///
/// Three successive box blurs, each a horizontal then vertical running-sum
/// pass over the premultiplied bytes. Edges are clamped.
pub fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    if !(sigma > 0.5) {
        return;
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let row_stride = width * 4;
    let data = pixmap.data_mut();
    let mut scratch = vec![0u8; data.len()];

    for radius in box_radii(sigma) {
        box_pass(data, &mut scratch, height, width, row_stride, 4, radius);
        box_pass(&scratch, data, width, height, 4, row_stride, radius);
    }
}

/// Box radii whose three-pass convolution matches a gaussian of `sigma`.
fn box_radii(sigma: f32) -> [usize; 3] {
    const PASSES: f32 = 3.0;

    let variance = 12.0 * sigma * sigma;
    let ideal = (variance / PASSES + 1.0).sqrt();
    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;

    let lf = lower as f32;
    let split = ((variance - PASSES * lf * lf - 4.0 * PASSES * lf - 3.0 * PASSES) / (-4.0 * lf - 4.0))
        .round() as i64;

    let mut radii = [0usize; 3];
    for (i, radius) in radii.iter_mut().enumerate() {
        let size = if (i as i64) < split { lower } else { upper };
        *radius = ((size - 1) / 2) as usize;
    }
    radii
}

/// One box-blur pass along `lines` runs of `line_len` pixels.
///
/// `line_stride` is the byte distance between runs and `step` the byte
/// distance between neighbours inside a run.
fn box_pass(
    src: &[u8],
    dst: &mut [u8],
    lines: usize,
    line_len: usize,
    line_stride: usize,
    step: usize,
    radius: usize,
) {
    if radius == 0 || line_len == 0 {
        dst.copy_from_slice(src);
        return;
    }

    let window = (2 * radius + 1) as u32;
    let last = line_len - 1;

    for line in 0..lines {
        let base = line * line_stride;
        let at = |i: usize| base + i * step;

        let mut acc = [0u32; 4];
        for i in 0..=2 * radius {
            let idx = at(i.saturating_sub(radius).min(last));
            for c in 0..4 {
                acc[c] += src[idx + c] as u32;
            }
        }

        for i in 0..line_len {
            let out = at(i);
            for c in 0..4 {
                dst[out + c] = ((acc[c] + window / 2) / window) as u8;
            }
            let add = at((i + radius + 1).min(last));
            let sub = at(i.saturating_sub(radius));
            for c in 0..4 {
                acc[c] += src[add + c] as u32;
                acc[c] -= src[sub + c] as u32;
            }
        }
    }
}

/// Parameters of a canvas-style drop shadow.
#[derive(Debug, Clone, Copy)]
pub struct ShadowStyle {
    /// Canvas `shadowBlur`; the gaussian sigma is half of this.
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub color: Color,
}

/// Draws the blurred, offset silhouette of `path` onto `canvas`.
///
/// Returns `false` when the offscreen buffer could not be allocated, in
/// which case nothing is drawn.
pub fn cast_shadow(canvas: &mut Pixmap, path: &Path, transform: Transform, style: &ShadowStyle) -> bool {
    let Some(mut layer) = Pixmap::new(canvas.width(), canvas.height()) else {
        let err = MockupError::offscreen(canvas.width(), canvas.height());
        tracing::warn!(%err, "skipping shadow");
        return false;
    };

    let offset = transform.post_translate(style.offset_x, style.offset_y);
    fill_color(&mut layer, path, style.color, offset, None);
    gaussian_blur(&mut layer, style.blur / 2.0);
    canvas.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    true
}

// ============================================================================
// Conversion
// ============================================================================

/// Converts a straight-alpha image into a premultiplied pixmap.
///
/// Returns `None` for zero-sized images.
pub fn rgba_image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Converts a premultiplied pixmap back into a straight-alpha image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

// ============================================================================
// Tests
// ============================================================================
