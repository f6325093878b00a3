//! Draw stages of a mockup render pass.
//!
//! Each stage implements [`LayerEffect`], which defines:
//! - Whether the stage draws anything for the current settings
//! - How it paints onto the shared canvas
//! - What properties it emits for later stages
//!
//! Properties flow through the pass via [`RenderContext`], so stages can
//! share intermediate results (such as the painted background) without
//! knowing about each other.

pub mod background;
pub mod frame;
pub mod glass;
pub mod raster;
pub mod reflection;
pub mod shadow;
pub mod text;

pub use background::{BackgroundFill, BackgroundLayer};
pub use frame::{FrameLayer, CHROME_BAR_COLOR, TRAFFIC_LIGHTS};
pub use glass::GlassLayer;
pub use reflection::ReflectionLayer;
pub use shadow::ShadowLayer;
pub use text::{TextOverlay, TextPlacement};

use std::any::{Any, TypeId};
use std::collections::HashMap;

use resvg::tiny_skia::Pixmap;

use crate::layout::CanvasFrame;
use crate::settings::RenderSettings;

// ============================================================================
// Render Context
// ============================================================================

/// State that flows through one render pass.
///
/// Stages can read properties set by earlier stages and emit new ones.
///
/// ```ignore
/// // The background stage emits its fill
/// ctx.set(BackgroundFill(pixmap));
///
/// // The glass stage reads it back
/// if let Some(fill) = ctx.get::<BackgroundFill>() {
///     // Refract it...
/// }
/// ```
pub struct RenderContext<'a> {
    /// The canvas being painted.
    pub canvas: Pixmap,

    /// Layout for this pass.
    pub frame: CanvasFrame,

    /// Clamped settings for this pass.
    pub settings: &'a RenderSettings,

    /// The source image, already downscaled to `frame.img_width`.
    pub source: &'a Pixmap,

    /// Typed property bag for inter-stage communication.
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        canvas: Pixmap,
        frame: CanvasFrame,
        settings: &'a RenderSettings,
        source: &'a Pixmap,
    ) -> Self {
        Self {
            canvas,
            frame,
            settings,
            source,
            properties: HashMap::new(),
        }
    }

    /// Sets a typed property that later stages can read.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.properties.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Gets a typed property set by an earlier stage.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }

    /// Ends the pass and hands back the painted canvas.
    pub fn into_canvas(self) -> Pixmap {
        self.canvas
    }
}

// ============================================================================
// Layer Trait
// ============================================================================

/// A single draw stage.
///
/// The separation of [`paint`](Self::paint) and [`emit`](Self::emit)
/// keeps property emission in one canonical place.
pub trait LayerEffect {
    /// Returns true if the stage draws anything for this pass.
    fn is_active(&self, _ctx: &RenderContext) -> bool {
        true
    }

    /// Paint onto `ctx.canvas`.
    fn paint(&self, ctx: &mut RenderContext);

    /// Emit properties for later stages. Called after [`paint`](Self::paint).
    fn emit(&self, _ctx: &mut RenderContext) {}
}

/// Runs a stage if it is active.
pub fn apply<L: LayerEffect>(layer: &L, ctx: &mut RenderContext) {
    if !layer.is_active(ctx) {
        return;
    }
    layer.paint(ctx);
    layer.emit(ctx);
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// Runs every stage of a pass in its fixed order.
///
/// ```text
/// Background ──► Reflection ──► Glass ──► Shadow ──► Frame ──► Text
///      │                          ▲
///      └──── BackgroundFill ──────┘
/// ```
///
/// The reflection redraws the frame internally into its own buffer. The
/// glass halo sits under the shadow and frame so the object appears to
/// float inside it. Text is only burned in when an overlay is supplied.
pub fn paint_all(ctx: &mut RenderContext, text: Option<&TextOverlay<'_>>) {
    apply(&BackgroundLayer, ctx);
    apply(&ReflectionLayer, ctx);
    apply(&GlassLayer, ctx);
    apply(&ShadowLayer, ctx);
    apply(&FrameLayer, ctx);
    if let Some(text) = text {
        apply(text, ctx);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::resolve;
    use crate::settings::{BackgroundSpec, HexColor};
    use crate::source::SizePx;
    use resvg::tiny_skia::Color;

    fn rgb_at(pixmap: &Pixmap, x: f32, y: f32) -> (u8, u8, u8) {
        let p = pixmap.pixel(x as u32, y as u32).unwrap();
        (p.red(), p.green(), p.blue())
    }

    fn blue_source(width: u32, height: u32) -> Pixmap {
        let mut source = Pixmap::new(width, height).unwrap();
        source.fill(Color::from_rgba8(0, 0, 255, 255));
        source
    }

    fn paint(settings: &RenderSettings, source: &Pixmap) -> (CanvasFrame, Pixmap) {
        let frame = resolve(SizePx::new(source.width(), source.height()), settings);
        let size = frame.pixel_size();
        let mut ctx = RenderContext::new(Pixmap::new(size.width, size.height).unwrap(), frame, settings, source);
        paint_all(&mut ctx, None);
        (frame, ctx.into_canvas())
    }

    /// White background, red shadow, opaque blue image.
    fn red_shadow_settings(glass: bool) -> RenderSettings {
        RenderSettings {
            padding: 60.0,
            inner_roundness: 0.0,
            shadow_intensity: 100.0,
            shadow_color: HexColor::rgb(0xff0000),
            glass_enabled: glass,
            background: BackgroundSpec::Solid { color: HexColor::WHITE },
            ..RenderSettings::default()
        }
    }

    #[test]
    fn background_fill_flows_to_glass() {
        let settings = RenderSettings {
            glass_enabled: true,
            ..RenderSettings::default()
        };
        let frame = resolve(SizePx::new(120, 80), &settings);
        let size = frame.pixel_size();
        let mut source = Pixmap::new(120, 80).unwrap();
        source.fill(Color::WHITE);

        let mut ctx = RenderContext::new(Pixmap::new(size.width, size.height).unwrap(), frame, &settings, &source);
        assert!(ctx.get::<BackgroundFill>().is_none());
        paint_all(&mut ctx, None);
        assert!(ctx.get::<BackgroundFill>().is_some());

        let canvas = ctx.into_canvas();
        let center = canvas.pixel(size.width / 2, size.height / 2).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (255, 255, 255));
        // Corner shows the opaque background.
        assert_eq!(canvas.pixel(0, 0).unwrap().alpha(), 255);
    }

    #[test]
    fn background_is_not_snapshotted_without_glass() {
        let settings = RenderSettings::default();
        let source = Pixmap::new(120, 80).unwrap();
        let frame = resolve(SizePx::new(120, 80), &settings);
        let size = frame.pixel_size();

        let mut ctx = RenderContext::new(Pixmap::new(size.width, size.height).unwrap(), frame, &settings, &source);
        paint_all(&mut ctx, None);
        assert!(ctx.get::<BackgroundFill>().is_none());
    }

    #[test]
    fn shadow_shows_below_object_in_its_colour() {
        let source = blue_source(200, 100);
        let (frame, canvas) = paint(&red_shadow_settings(false), &source);
        let cx = frame.object.x + frame.object.width / 2.0;

        // The frame covers the black caster completely.
        assert_eq!(rgb_at(&canvas, cx, frame.object.y + frame.object.height / 2.0), (0, 0, 255));
        assert_eq!(rgb_at(&canvas, cx, frame.object.bottom() - 2.0), (0, 0, 255));

        let (r, g, b) = rgb_at(&canvas, cx, frame.object.bottom() + 10.0);
        assert!(r >= 250, "shadow red channel {r}");
        assert!(g < 220 && b < 220, "shadow should tint white towards red, got ({r}, {g}, {b})");
        assert!(g.abs_diff(b) <= 2);

        // Far corner is plain background, give or take the blur tail.
        let (r, g, b) = rgb_at(&canvas, 1.0, 1.0);
        assert!(r >= 250 && g >= 245 && b >= 245, "corner ({r}, {g}, {b})");
    }

    #[test]
    fn glass_sits_under_shadow_and_frame() {
        let source = blue_source(200, 100);
        let (frame, canvas) = paint(&red_shadow_settings(true), &source);
        let cx = frame.object.x + frame.object.width / 2.0;

        // The white pane tint would lighten the image if it came after the frame.
        assert_eq!(rgb_at(&canvas, cx, frame.object.y + frame.object.height / 2.0), (0, 0, 255));

        let (r, g, b) = rgb_at(&canvas, cx, frame.object.bottom() + 10.0);
        assert!(r > g.saturating_add(30) && r > b.saturating_add(30), "got ({r}, {g}, {b})");
    }

    #[test]
    fn inactive_stage_is_skipped() {
        let settings = RenderSettings {
            shadow_intensity: 0.0,
            ..RenderSettings::default()
        };
        let frame = resolve(SizePx::new(50, 50), &settings);
        let size = frame.pixel_size();
        let source = Pixmap::new(50, 50).unwrap();
        let mut ctx = RenderContext::new(Pixmap::new(size.width, size.height).unwrap(), frame, &settings, &source);

        apply(&ShadowLayer, &mut ctx);
        assert!(ctx.canvas.pixels().iter().all(|p| p.alpha() == 0));
    }
}
