//! Mockup rendering engine.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use resvg::tiny_skia::Pixmap;

use crate::error::{MockupError, MockupResult};
use crate::export::ExportState;
use crate::font::FontBook;
use crate::layer::raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};
use crate::layer::{RenderContext, TextOverlay, TextPlacement, paint_all};
use crate::layout::{self, CanvasFrame};
use crate::settings::{MockupProfile, RenderSettings, TextLayer};
use crate::source::SourceImage;

/// Width reported by [`MockupRenderer::canvas_width`] before the first render.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1000;

/// Largest canvas, in pixels, a pass will allocate.
///
/// Fixed aspect ratios grow the canvas around the padded object and never
/// crop, so an extreme ratio paired with an extreme source can ask for a
/// huge buffer. Such passes fail with [`MockupError::ResourceUnavailable`].
pub const MAX_CANVAS_PIXELS: u64 = 64_000_000;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`MockupProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &MockupProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> MockupProfile;
}

// ============================================================================
// Prepared Source
// ============================================================================

/// A source image together with its downscaled drawing copy.
struct PreparedSource {
    original: SourceImage,
    pixmap: Pixmap,
}

impl PreparedSource {
    fn new(original: SourceImage) -> MockupResult<Self> {
        let natural = original.dimensions();
        let scale = (layout::MAX_WIDTH / natural.width.max(1) as f32).min(1.0);

        let pixmap = if scale < 1.0 {
            let width = ((natural.width as f32 * scale).round() as u32).max(1);
            let height = ((natural.height as f32 * scale).round() as u32).max(1);
            tracing::debug!(from_width = natural.width, to_width = width, "downscaling source image");
            let resized = imageops::resize(original.pixels(), width, height, FilterType::Triangle);
            rgba_image_to_pixmap(&resized)
        } else {
            rgba_image_to_pixmap(original.pixels())
        };
        let pixmap =
            pixmap.ok_or_else(|| MockupError::resource_unavailable("source image has no pixels"))?;

        Ok(Self { original, pixmap })
    }
}

// ============================================================================
// Preview
// ============================================================================

/// The interactive view of a mockup.
///
/// The raster never contains text; the text layer is described separately
/// so it can be drawn and dragged on top.
#[derive(Debug, Clone)]
pub struct Preview {
    pub raster: RgbaImage,
    pub frame: CanvasFrame,
    pub text: Option<TextPlacement>,
}

// ============================================================================
// MockupRenderer
// ============================================================================

/// Main mockup rendering engine.
///
/// `MockupRenderer` owns the source image, the current settings and text
/// layer, and the single interactive canvas. Settings are replaced
/// wholesale; every pass re-derives the layout from them.
///
/// # Draw order
///
/// 1. **Background** - solid or gradient fill, rounded by `outer_roundness`
/// 2. **Reflection** - faded mirror of the frame below the object
/// 3. **Glass** - frosted halo around the object
/// 4. **Shadow** - soft drop shadow under the object
/// 5. **Frame** - the image, clipped to a rounded rect, with optional chrome
/// 6. **Text** - burned in for export passes only
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use mockup_renderer::{MockupRenderer, RenderSettings, SourceImage};
///
/// let mut renderer = MockupRenderer::new();
/// renderer.set_source(SourceImage::new(RgbaImage::new(320, 200))).unwrap();
/// renderer.set_settings(RenderSettings { padding: 60.0, ..RenderSettings::default() });
///
/// let preview = renderer.compose_preview().unwrap();
/// assert!(preview.raster.width() > 320);
/// ```
pub struct MockupRenderer {
    source: Option<PreparedSource>,
    settings: RenderSettings,
    text: Option<TextLayer>,
    fonts: FontBook,

    /// The interactive canvas, repainted in full by every pass.
    pub(crate) canvas: Option<Pixmap>,
    pub(crate) text_burned: bool,
    pub(crate) export_state: ExportState,
    render_token: u64,
}

impl Default for MockupRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockupRenderer {
    /// Creates a renderer with default settings and system font lookup.
    pub fn new() -> Self {
        Self::with_fonts(FontBook::new())
    }

    /// Creates a renderer that draws text from the given font book.
    pub fn with_fonts(fonts: FontBook) -> Self {
        Self {
            source: None,
            settings: RenderSettings::default(),
            text: None,
            fonts,
            canvas: None,
            text_burned: false,
            export_state: ExportState::Idle,
            render_token: 0,
        }
    }

    /// Replaces the source image.
    ///
    /// The interactive canvas is dropped until the next render.
    pub fn set_source(&mut self, source: SourceImage) -> MockupResult<()> {
        self.source = Some(PreparedSource::new(source)?);
        self.canvas = None;
        self.text_burned = false;
        Ok(())
    }

    pub fn clear_source(&mut self) {
        self.source = None;
        self.canvas = None;
        self.text_burned = false;
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref().map(|s| &s.original)
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
    }

    pub fn text(&self) -> Option<&TextLayer> {
        self.text.as_ref()
    }

    pub fn set_text(&mut self, text: Option<TextLayer>) {
        self.text = text;
    }

    /// Mutable access to the text layer, e.g. while dragging it.
    pub fn text_mut(&mut self) -> Option<&mut TextLayer> {
        self.text.as_mut()
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Layout for the current source and settings.
    pub fn frame(&self) -> Option<CanvasFrame> {
        let source = self.source.as_ref()?;
        Some(layout::resolve(source.original.dimensions(), &self.settings.clamped()))
    }

    /// Repaints the interactive canvas.
    ///
    /// With `include_text` the text layer is burned in; export passes do this
    /// and immediately render again without it.
    pub fn render(&mut self, include_text: bool) -> MockupResult<&Pixmap> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| MockupError::resource_unavailable("no source image loaded"))?;
        self.render_token += 1;
        let text = self.text.as_ref().filter(|t| include_text && t.is_visible());

        let canvas = paint_pass(source, &self.settings, text, &self.fonts, self.render_token)?;
        self.text_burned = text.is_some();
        Ok(self.canvas.insert(canvas))
    }

    /// The interactive canvas as of the last render.
    pub fn canvas(&self) -> Option<&Pixmap> {
        self.canvas.as_ref()
    }

    /// Returns true while the interactive canvas carries burned-in text.
    pub fn is_text_burned(&self) -> bool {
        self.text_burned
    }

    /// Current canvas width in pixels, [`DEFAULT_CANVAS_WIDTH`] before the
    /// first render.
    pub fn canvas_width(&self) -> u32 {
        self.canvas
            .as_ref()
            .map_or(DEFAULT_CANVAS_WIDTH, |c| c.width())
    }

    /// Number of passes started on the interactive canvas.
    pub fn render_token(&self) -> u64 {
        self.render_token
    }

    pub fn export_state(&self) -> ExportState {
        self.export_state
    }

    /// Composes the interactive preview: a text-free raster plus the
    /// placement of the separate text layer.
    ///
    /// Leaves the interactive canvas untouched.
    pub fn compose_preview(&self) -> MockupResult<Preview> {
        let source = self.require_source()?;
        let frame = layout::resolve(source.original.dimensions(), &self.settings.clamped());
        let raster = paint_pass(source, &self.settings, None, &self.fonts, self.render_token)?;
        let text = self
            .text
            .as_ref()
            .filter(|t| t.is_visible())
            .map(|t| TextPlacement::resolve(t, &frame));

        Ok(Preview {
            raster: pixmap_to_rgba_image(&raster),
            frame,
            text,
        })
    }

    /// Composes the export raster in a single pass with the text burned in.
    ///
    /// Leaves the interactive canvas untouched.
    pub fn compose_export(&self) -> MockupResult<RgbaImage> {
        let source = self.require_source()?;
        let text = self.text.as_ref().filter(|t| t.is_visible());
        let raster = paint_pass(source, &self.settings, text, &self.fonts, self.render_token)?;
        Ok(pixmap_to_rgba_image(&raster))
    }

    fn require_source(&self) -> MockupResult<&PreparedSource> {
        self.source
            .as_ref()
            .ok_or_else(|| MockupError::resource_unavailable("no source image loaded"))
    }
}

impl Configurable for MockupRenderer {
    fn apply_profile(&mut self, profile: &MockupProfile) {
        self.settings = profile.settings.clone();
        self.text = profile.text.clone();
    }

    fn export_profile(&self) -> MockupProfile {
        MockupProfile {
            settings: self.settings.clone(),
            text: self.text.clone(),
        }
    }
}

impl std::fmt::Debug for MockupRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockupRenderer")
            .field("source", &self.source().map(SourceImage::dimensions))
            .field("settings", &self.settings)
            .field("text", &self.text)
            .field("canvas_width", &self.canvas_width())
            .field("text_burned", &self.text_burned)
            .field("render_token", &self.render_token)
            .finish()
    }
}

/// Paints one full pass into a fresh canvas.
fn paint_pass(
    source: &PreparedSource,
    settings: &RenderSettings,
    text: Option<&TextLayer>,
    fonts: &FontBook,
    token: u64,
) -> MockupResult<Pixmap> {
    let settings = settings.clamped();
    let frame = layout::resolve(source.original.dimensions(), &settings);
    let size = frame.pixel_size();

    if size.area() > MAX_CANVAS_PIXELS {
        return Err(MockupError::resource_unavailable(format!(
            "canvas {}x{} exceeds {MAX_CANVAS_PIXELS} pixels",
            size.width, size.height
        )));
    }
    let canvas = Pixmap::new(size.width, size.height).ok_or_else(|| {
        MockupError::resource_unavailable(format!(
            "cannot allocate {}x{} canvas",
            size.width, size.height
        ))
    })?;

    tracing::debug!(
        width = size.width,
        height = size.height,
        token,
        include_text = text.is_some(),
        "render pass"
    );

    let overlay = text.map(|layer| TextOverlay::new(layer, fonts));
    let mut ctx = RenderContext::new(canvas, frame, &settings, &source.pixmap);
    paint_all(&mut ctx, overlay.as_ref());
    Ok(ctx.into_canvas())
}

// ============================================================================
// Tests
// ============================================================================
