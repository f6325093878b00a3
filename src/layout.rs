//! Canvas layout resolution.
//!
//! [`resolve`] is a pure function of the source dimensions and the render
//! settings. It runs at the start of every pass and its result is thrown
//! away afterwards, so there is nothing to invalidate when settings change.

use crate::settings::RenderSettings;
use crate::source::{RectF, SizePx};

/// Sources wider than this are downscaled before drawing. Never upscaled.
pub const MAX_WIDTH: f32 = 2400.0;

/// Width of the reference image that padding and radii are expressed against.
pub const REFERENCE_WIDTH: f32 = 800.0;

/// Title bar height at reference scale, before small-image compensation.
const CHROME_BASE_HEIGHT: f32 = 40.0;

/// Placement of everything on the canvas for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasFrame {
    pub final_width: f32,
    pub final_height: f32,

    /// Object (chrome bar + image) bounds.
    pub object: RectF,

    /// Downscaled image size. `img_width` is the base for every relative unit.
    pub img_width: f32,
    pub img_height: f32,

    /// Height of the simulated title bar, 0 when chrome is off.
    pub chrome_height: f32,

    /// Padding converted from reference pixels.
    pub relative_padding: f32,

    /// Object corner radius.
    pub corner_radius: f32,

    /// Canvas corner radius, at most half the smaller canvas side.
    pub outer_radius: f32,
}

impl CanvasFrame {
    /// Integer canvas size used for the pixel buffer.
    pub fn pixel_size(&self) -> SizePx {
        SizePx::new(
            self.final_width.round().max(1.0) as u32,
            self.final_height.round().max(1.0) as u32,
        )
    }

    /// Canvas bounds as a rectangle at the origin.
    pub fn canvas_rect(&self) -> RectF {
        RectF::from_size(self.final_width, self.final_height)
    }

    /// The image area inside the object, below the chrome bar.
    pub fn image_rect(&self) -> RectF {
        RectF::new(
            self.object.x,
            self.object.y + self.chrome_height,
            self.object.width,
            self.object.height - self.chrome_height,
        )
    }

    /// Converts a length in 1000px-reference units to canvas pixels.
    pub fn per_mille(&self, value: f32) -> f32 {
        value * (self.img_width / 1000.0)
    }

    /// Largest radius allowed anywhere on this canvas.
    pub fn max_radius(&self) -> f32 {
        self.final_width.min(self.final_height) / 2.0
    }
}

/// Computes canvas size and object placement.
///
/// The canvas only ever grows around the padded object: a fixed aspect
/// ratio is reached by lengthening the short side, never by cropping.
pub fn resolve(natural: SizePx, settings: &RenderSettings) -> CanvasFrame {
    let natural_width = natural.width.max(1) as f32;
    let natural_height = natural.height.max(1) as f32;

    let scale = (MAX_WIDTH / natural_width).min(1.0);
    let img_width = natural_width * scale;
    let img_height = natural_height * scale;

    // Small images get a proportionally taller bar so it stays legible.
    let chrome_height = if settings.window_chrome_enabled {
        CHROME_BASE_HEIGHT * scale * (1000.0 / img_width).max(1.0) * 0.8
    } else {
        0.0
    };

    let object_width = img_width;
    let object_height = img_height + chrome_height;

    let relative_padding = settings.padding.max(0.0) * (img_width / REFERENCE_WIDTH) * 1.5;
    let min_width = object_width + relative_padding * 2.0;
    let min_height = object_height + relative_padding * 2.0;

    let (final_width, final_height) = match settings.aspect_ratio.target() {
        None => (min_width, min_height),
        Some(ratio) if min_width / min_height > ratio => (min_width, min_width / ratio),
        Some(ratio) => (min_height * ratio, min_height),
    };

    let object = RectF::new(
        (final_width - object_width) / 2.0,
        (final_height - object_height) / 2.0,
        object_width,
        object_height,
    );

    let reference_scale = img_width / REFERENCE_WIDTH;
    let max_radius = final_width.min(final_height) / 2.0;
    let corner_radius = (settings.inner_roundness.max(0.0) * reference_scale)
        .min(object_width.min(object_height) / 2.0);
    let outer_radius = (settings.outer_roundness.max(0.0) * reference_scale).min(max_radius);

    CanvasFrame {
        final_width,
        final_height,
        object,
        img_width,
        img_height,
        chrome_height,
        relative_padding,
        corner_radius,
        outer_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AspectRatio;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * a.abs().max(b.abs()).max(1.0)
    }

    fn scenario_a() -> RenderSettings {
        RenderSettings {
            padding: 60.0,
            inner_roundness: 12.0,
            shadow_intensity: 0.0,
            reflection_intensity: 0.0,
            window_chrome_enabled: false,
            aspect_ratio: AspectRatio::Auto,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn auto_layout_pads_and_centers() {
        let frame = resolve(SizePx::new(2000, 1000), &scenario_a());

        // 60 * (2000 / 800) * 1.5 = 225
        assert!(approx(frame.relative_padding, 225.0));
        assert!(approx(frame.final_width, 2450.0));
        assert!(approx(frame.final_height, 1450.0));
        assert!(approx(frame.object.x, 225.0));
        assert!(approx(frame.object.y, 225.0));
        assert_eq!(frame.chrome_height, 0.0);
        assert_eq!(frame.pixel_size(), SizePx::new(2450, 1450));
        assert!(approx(frame.corner_radius, 30.0));
    }

    #[test]
    fn square_ratio_grows_short_side() {
        let settings = RenderSettings {
            aspect_ratio: AspectRatio::Square,
            ..scenario_a()
        };
        let frame = resolve(SizePx::new(2000, 1000), &settings);
        assert!(approx(frame.final_width, 2450.0));
        assert!(approx(frame.final_height, 2450.0));
        assert!(approx(frame.object.y, (2450.0 - 1000.0) / 2.0));
    }

    #[test]
    fn every_ratio_hits_target_without_cropping() {
        let sizes = [
            SizePx::new(2000, 1000),
            SizePx::new(300, 1200),
            SizePx::new(5000, 400),
            SizePx::new(1, 1),
        ];
        for size in sizes {
            for padding in [0.0, 33.0, 120.0] {
                for chrome in [false, true] {
                    let base = RenderSettings {
                        padding,
                        window_chrome_enabled: chrome,
                        ..RenderSettings::default()
                    };
                    let auto = resolve(size, &base);
                    assert!(auto.final_width + 1e-3 >= auto.object.width + 2.0 * auto.relative_padding);
                    assert!(auto.final_height + 1e-3 >= auto.object.height + 2.0 * auto.relative_padding);

                    for ratio in AspectRatio::ALL.into_iter().skip(1) {
                        let frame = resolve(size, &RenderSettings { aspect_ratio: ratio, ..base.clone() });
                        let target = ratio.target().unwrap();
                        assert!(approx(frame.final_width / frame.final_height, target), "{ratio:?}");
                        assert!(frame.final_width + 1e-3 >= auto.final_width);
                        assert!(frame.final_height + 1e-3 >= auto.final_height);
                    }
                }
            }
        }
    }

    #[test]
    fn radii_never_exceed_half_canvas() {
        for roundness in [0.0, 12.0, 60.0, 5000.0] {
            let settings = RenderSettings {
                padding: 0.0,
                inner_roundness: roundness,
                outer_roundness: roundness,
                ..RenderSettings::default()
            };
            let frame = resolve(SizePx::new(200, 50), &settings);
            assert!(frame.corner_radius <= frame.max_radius());
            assert!(frame.outer_radius <= frame.max_radius());
        }
    }

    #[test]
    fn large_sources_are_downscaled_small_ones_kept() {
        let big = resolve(SizePx::new(4800, 2400), &scenario_a());
        assert!(approx(big.img_width, 2400.0));
        assert!(approx(big.img_height, 1200.0));

        let small = resolve(SizePx::new(400, 300), &scenario_a());
        assert!(approx(small.img_width, 400.0));
        assert!(approx(small.img_height, 300.0));
    }

    #[test]
    fn chrome_is_boosted_on_small_images() {
        let settings = RenderSettings {
            window_chrome_enabled: true,
            ..scenario_a()
        };
        let small = resolve(SizePx::new(400, 300), &settings);
        // 40 * 1 * (1000 / 400) * 0.8 = 80
        assert!(approx(small.chrome_height, 80.0));
        assert!(approx(small.object.height, 380.0));
        assert_eq!(small.image_rect().y, small.object.y + 80.0);

        let wide = resolve(SizePx::new(2000, 1000), &settings);
        // Compensation floors at 1: 40 * 1 * 1 * 0.8
        assert!(approx(wide.chrome_height, 32.0));
    }
}
