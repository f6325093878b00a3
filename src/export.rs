//! Export controller: data URL, clipboard and file download.
//!
//! Every export burns the text layer into the interactive canvas, extracts
//! the result and then repaints the canvas without text. The repaint runs
//! on every exit path, so the canvas is never left text-burned once an
//! export returns.
//!
//! Exports take `&mut MockupRenderer`, so two of them can never overlap on
//! the same renderer.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use resvg::tiny_skia::Pixmap;

use crate::error::{MockupError, MockupResult, SinkError};
use crate::layer::raster::{encode_png, pixmap_to_rgba_image};
use crate::renderer::MockupRenderer;

/// File name used by [`MockupRenderer::download`].
pub const EXPORT_FILE_NAME: &str = "ezibreezy-mockup.png";

/// Where an export currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    RenderingWithText,
    Extracted,
    RenderingWithoutText,
}

/// Destination for PNG bytes copied to the clipboard.
///
/// Implemented by the caller on top of whatever clipboard the platform has.
pub trait ClipboardSink {
    fn write_png(&mut self, png: &[u8]) -> Result<(), SinkError>;
}

// ============================================================================
// Export Pass
// ============================================================================

/// Holds the renderer for the duration of an export and repaints the
/// canvas without text when dropped.
struct ExportPass<'r> {
    renderer: &'r mut MockupRenderer,
}

impl<'r> ExportPass<'r> {
    fn begin(renderer: &'r mut MockupRenderer) -> Self {
        renderer.export_state = ExportState::RenderingWithText;
        Self { renderer }
    }
}

impl Drop for ExportPass<'_> {
    fn drop(&mut self) {
        self.renderer.export_state = ExportState::RenderingWithoutText;
        if let Err(err) = self.renderer.render(false) {
            tracing::warn!(%err, "cleanup render failed");
            if self.renderer.text_burned {
                self.renderer.canvas = None;
                self.renderer.text_burned = false;
            }
        }
        self.renderer.export_state = ExportState::Idle;
    }
}

impl MockupRenderer {
    /// Renders with text, hands the canvas to `extract`, then restores the
    /// text-free canvas.
    fn with_text_burned<T>(&mut self, extract: impl FnOnce(&Pixmap) -> T) -> MockupResult<T> {
        let pass = ExportPass::begin(self);
        let canvas = pass.renderer.render(true)?;
        let extracted = extract(canvas);
        pass.renderer.export_state = ExportState::Extracted;
        Ok(extracted)
    }

    /// Encodes the export raster as a `data:image/png;base64,` URL.
    ///
    /// Returns `None` when there is nothing to render or encoding fails.
    pub fn data_url(&mut self) -> Option<String> {
        if !self.has_source() {
            return None;
        }
        match self.with_text_burned(|canvas| encode_png(&pixmap_to_rgba_image(canvas))) {
            Ok(Ok(png)) => Some(format!("data:image/png;base64,{}", STANDARD.encode(png))),
            Ok(Err(err)) => {
                tracing::warn!(%err, "PNG encoding failed");
                None
            }
            Err(err) => {
                tracing::warn!(%err, "export render failed");
                None
            }
        }
    }

    /// Writes the export raster to the clipboard as PNG.
    ///
    /// Does nothing when no source is loaded. Encode and clipboard failures
    /// are returned after the canvas has been restored.
    pub fn copy<S: ClipboardSink + ?Sized>(&mut self, sink: &mut S) -> MockupResult<()> {
        if !self.has_source() {
            return Ok(());
        }
        self.with_text_burned(|canvas| -> MockupResult<()> {
            let png = encode_png(&pixmap_to_rgba_image(canvas))?;
            sink.write_png(&png).map_err(MockupError::clipboard)
        })?
    }

    /// Saves the export raster as [`EXPORT_FILE_NAME`] inside `dir`.
    ///
    /// Returns the written path, or `None` when no source is loaded.
    pub fn download(&mut self, dir: impl AsRef<Path>) -> MockupResult<Option<PathBuf>> {
        if !self.has_source() {
            return Ok(None);
        }
        let png = self.with_text_burned(|canvas| encode_png(&pixmap_to_rgba_image(canvas)))??;

        let path = dir.as_ref().join(EXPORT_FILE_NAME);
        std::fs::write(&path, png).map_err(|source| MockupError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "mockup saved");
        Ok(Some(path))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontBook, FontFamily};
    use crate::settings::{RenderSettings, TextLayer};
    use crate::source::SourceImage;
    use image::{Rgba, RgbaImage};

    /// Records what was written, or refuses every write.
    #[derive(Default)]
    struct FakeClipboard {
        refuse: bool,
        written: Vec<Vec<u8>>,
    }

    impl ClipboardSink for FakeClipboard {
        fn write_png(&mut self, png: &[u8]) -> Result<(), SinkError> {
            if self.refuse {
                return Err("clipboard permission denied".into());
            }
            self.written.push(png.to_vec());
            Ok(())
        }
    }

    fn renderer(fonts: FontBook) -> MockupRenderer {
        let mut renderer = MockupRenderer::with_fonts(fonts);
        let img = RgbaImage::from_pixel(240, 160, Rgba([20, 20, 20, 255]));
        renderer.set_source(SourceImage::new(img)).unwrap();
        renderer.set_settings(RenderSettings {
            reflection_intensity: 40.0,
            window_chrome_enabled: true,
            ..RenderSettings::default()
        });
        let mut text = TextLayer::new("Launch");
        text.font_size = 300.0;
        text.set_position(50.0, 50.0);
        renderer.set_text(Some(text));
        renderer
    }

    fn has_font() -> bool {
        FontBook::new().resolve(FontFamily::Inter).is_some()
    }

    #[test]
    fn no_source_means_no_export() {
        let mut renderer = MockupRenderer::with_fonts(FontBook::empty());
        assert!(renderer.data_url().is_none());
        assert!(renderer.copy(&mut FakeClipboard::default()).is_ok());
        let dir = std::env::temp_dir();
        assert!(renderer.download(&dir).unwrap().is_none());
    }

    #[test]
    fn data_url_is_png() {
        let mut renderer = renderer(FontBook::empty());
        let url = renderer.data_url().unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(payload).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(renderer.export_state(), ExportState::Idle);
    }

    #[test]
    fn data_url_is_idempotent() {
        let mut renderer = renderer(FontBook::new());
        let first = renderer.data_url().unwrap();
        let second = renderer.data_url().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn export_leaves_canvas_without_text() {
        let mut renderer = renderer(FontBook::new());
        let url = renderer.data_url().unwrap();
        assert!(!renderer.is_text_burned());
        assert_eq!(renderer.render_token(), 2);

        if !has_font() {
            return;
        }
        let interactive = pixmap_to_rgba_image(renderer.canvas().unwrap());
        let exported = renderer.compose_export().unwrap();
        assert_ne!(interactive, exported);
        let exported_png = encode_png(&exported).unwrap();
        assert_eq!(url, format!("data:image/png;base64,{}", STANDARD.encode(exported_png)));
    }

    #[test]
    fn copy_writes_png_to_clipboard() {
        let mut renderer = renderer(FontBook::empty());
        let mut clipboard = FakeClipboard::default();
        renderer.copy(&mut clipboard).unwrap();

        assert_eq!(clipboard.written.len(), 1);
        let decoded = image::load_from_memory(&clipboard.written[0]).unwrap();
        assert_eq!(decoded.width(), renderer.canvas_width());
    }

    #[test]
    fn clipboard_failure_propagates_and_restores_canvas() {
        let mut renderer = renderer(FontBook::new());
        let mut clipboard = FakeClipboard {
            refuse: true,
            ..FakeClipboard::default()
        };

        let err = renderer.copy(&mut clipboard).unwrap_err();
        assert!(matches!(err, MockupError::ClipboardWrite { .. }));
        assert!(err.to_string().contains("permission denied"));
        assert!(!renderer.is_text_burned());
        assert_eq!(renderer.export_state(), ExportState::Idle);

        // The canvas left behind is the plain interactive one.
        let after_failure = renderer.canvas().unwrap().clone();
        let plain = renderer.render(false).unwrap();
        assert_eq!(after_failure.data(), plain.data());

        // A following data URL still works.
        assert!(renderer.data_url().is_some());
        assert!(!renderer.is_text_burned());
    }

    #[test]
    fn download_writes_named_file() {
        let dir = std::env::temp_dir().join(format!("mockup-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut renderer = renderer(FontBook::empty());
        let path = renderer.download(&dir).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);

        let saved = image::open(&path).unwrap();
        assert_eq!(saved.width(), renderer.canvas_width());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn download_into_missing_directory_fails_cleanly() {
        let dir = std::env::temp_dir().join("mockup-export-missing").join("nested");
        let mut renderer = renderer(FontBook::empty());
        let err = renderer.download(&dir).unwrap_err();
        assert!(matches!(err, MockupError::Write { .. }));
        assert!(!renderer.is_text_burned());
    }
}
