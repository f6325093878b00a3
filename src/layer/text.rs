//! Text overlay: placement for the interactive preview and burn-in for
//! export.

use ab_glyph::{Font, GlyphId, PxScale, ScaleFont, point};
use resvg::tiny_skia::{ColorU8, Pixmap, PixmapPaint, Transform};

use super::raster::gaussian_blur;
use super::{LayerEffect, RenderContext};
use crate::font::{FontBook, FontFamily, LoadedFont};
use crate::layout::CanvasFrame;
use crate::settings::{HexColor, TextLayer};

/// Legibility shadow: blur, vertical drop and opacity.
const SHADOW_BLUR: f32 = 4.0;
const SHADOW_OFFSET_Y: i32 = 2;
const SHADOW_ALPHA: f32 = 0.3;

/// Where and how the text lands on a particular canvas.
///
/// The interactive preview positions a separate text element from this;
/// the export pass rasterizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub color: HexColor,
    pub family: FontFamily,
    /// Font size in canvas pixels.
    pub font_size: f32,
    /// Centre of the text in canvas pixels.
    pub center_x: f32,
    pub center_y: f32,
}

impl TextPlacement {
    pub fn resolve(layer: &TextLayer, frame: &CanvasFrame) -> Self {
        let layer = layer.clamped();
        Self {
            center_x: layer.x_percent / 100.0 * frame.final_width,
            center_y: layer.y_percent / 100.0 * frame.final_height,
            font_size: frame.per_mille(layer.font_size),
            color: layer.color,
            family: layer.font_family,
            text: layer.text,
        }
    }
}

/// Burns a single line of text into the canvas.
pub struct TextOverlay<'a> {
    layer: &'a TextLayer,
    fonts: &'a FontBook,
}

impl<'a> TextOverlay<'a> {
    pub fn new(layer: &'a TextLayer, fonts: &'a FontBook) -> Self {
        Self { layer, fonts }
    }
}

impl LayerEffect for TextOverlay<'_> {
    fn is_active(&self, _ctx: &RenderContext) -> bool {
        self.layer.is_visible()
    }

    fn paint(&self, ctx: &mut RenderContext) {
        let placement = TextPlacement::resolve(self.layer, &ctx.frame);
        let Some(font) = self.fonts.resolve(placement.family) else {
            tracing::warn!(family = placement.family.display_name(), "no font available, text not drawn");
            return;
        };
        burn_text(&mut ctx.canvas, &font, &placement);
    }
}

/// Rasterizes `placement` onto `canvas`, shadow first.
pub fn burn_text(canvas: &mut Pixmap, font: &LoadedFont, placement: &TextPlacement) {
    let (width, height) = (canvas.width(), canvas.height());
    let coverage = rasterize(font, placement, width, height);

    if let Some(mut shadow) = tint(&coverage, width, height, HexColor::BLACK, SHADOW_ALPHA) {
        gaussian_blur(&mut shadow, SHADOW_BLUR / 2.0);
        canvas.draw_pixmap(
            0,
            SHADOW_OFFSET_Y,
            shadow.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
    if let Some(fill) = tint(&coverage, width, height, placement.color, 1.0) {
        canvas.draw_pixmap(0, 0, fill.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    }
}

/// Per-pixel glyph coverage for the centred line of text.
///
/// Regular faces are emboldened by striking each glyph a few times with a
/// small horizontal offset.
fn rasterize(font: &LoadedFont, placement: &TextPlacement, width: u32, height: u32) -> Vec<f32> {
    let mut coverage = vec![0.0f32; width as usize * height as usize];
    if placement.font_size <= 0.0 {
        return coverage;
    }

    let scale = PxScale::from(placement.font_size);
    let scaled = font.font.as_scaled(scale);

    let mut glyphs: Vec<(GlyphId, f32)> = Vec::new();
    let mut caret = 0.0;
    let mut previous: Option<GlyphId> = None;
    for ch in placement.text.chars().filter(|c| !c.is_control()) {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push((id, caret));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    let embolden = if font.bold { 0.0 } else { (placement.font_size * 0.03).max(1.0) };
    let strikes: &[f32] = if font.bold { &[0.0] } else { &[0.0, 0.5, 1.0] };

    let left = placement.center_x - (caret + embolden) / 2.0;
    let baseline = placement.center_y + (scaled.ascent() + scaled.descent()) / 2.0;

    for &(id, x) in &glyphs {
        for strike in strikes {
            let position = point(left + x + strike * embolden, baseline);
            let Some(outlined) = font.font.outline_glyph(id.with_scale_and_position(scale, position)) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let idx = py as usize * width as usize + px as usize;
                coverage[idx] = coverage[idx].max(c);
            });
        }
    }

    coverage
}

/// Turns a coverage map into a premultiplied colour layer.
fn tint(coverage: &[f32], width: u32, height: u32, color: HexColor, alpha: f32) -> Option<Pixmap> {
    let mut layer = Pixmap::new(width, height)?;
    for (dst, &c) in layer.pixels_mut().iter_mut().zip(coverage) {
        if c <= 0.0 {
            continue;
        }
        let a = (c.min(1.0) * alpha * 255.0).round() as u8;
        *dst = ColorU8::from_rgba(color.r, color.g, color.b, a).premultiply();
    }
    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::resolve;
    use crate::settings::RenderSettings;
    use crate::source::SizePx;
    use resvg::tiny_skia::Color;

    fn frame() -> CanvasFrame {
        resolve(SizePx::new(500, 250), &RenderSettings { padding: 0.0, ..RenderSettings::default() })
    }

    #[test]
    fn placement_maps_percentages_to_canvas() {
        let frame = frame();
        let mut layer = TextLayer::new("Hello");
        layer.set_position(25.0, 80.0);
        layer.font_size = 100.0;

        let placement = TextPlacement::resolve(&layer, &frame);
        assert!((placement.center_x - 125.0).abs() < 1e-3);
        assert!((placement.center_y - 200.0).abs() < 1e-3);
        // 100 * (500 / 1000)
        assert!((placement.font_size - 50.0).abs() < 1e-3);
    }

    #[test]
    fn placement_clamps_out_of_range_layer() {
        let frame = frame();
        let layer = TextLayer {
            x_percent: 250.0,
            y_percent: -5.0,
            ..TextLayer::new("x")
        };
        let placement = TextPlacement::resolve(&layer, &frame);
        assert!((placement.center_x - frame.final_width).abs() < 1e-3);
        assert_eq!(placement.center_y, 0.0);
    }

    #[test]
    fn tint_scales_alpha_by_coverage() {
        let coverage = [0.0, 0.5, 1.0, 2.0];
        let layer = tint(&coverage, 4, 1, HexColor::WHITE, 1.0).unwrap();
        assert_eq!(layer.pixel(0, 0).unwrap().alpha(), 0);
        assert_eq!(layer.pixel(1, 0).unwrap().alpha(), 128);
        assert_eq!(layer.pixel(2, 0).unwrap().alpha(), 255);
        assert_eq!(layer.pixel(3, 0).unwrap().alpha(), 255);
    }

    #[test]
    fn burn_text_changes_pixels_when_a_font_exists() {
        let Some(font) = FontBook::new().resolve(FontFamily::Inter) else {
            return;
        };
        let frame = frame();
        let size = frame.pixel_size();
        let mut canvas = Pixmap::new(size.width, size.height).unwrap();
        canvas.fill(Color::BLACK);
        let before = canvas.clone();

        let mut layer = TextLayer::new("Mockup");
        layer.font_size = 200.0;
        layer.set_position(50.0, 50.0);
        burn_text(&mut canvas, &font, &TextPlacement::resolve(&layer, &frame));

        assert_ne!(canvas.data(), before.data());
        // Nothing lands far from the centred line.
        assert_eq!(canvas.pixel(2, 2).unwrap().red(), 0);
    }
}
