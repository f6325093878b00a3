//! mockup-renderer: Image mockup compositing engine
//!
//! This crate turns a raster image into a styled "mockup": a background
//! fill, a rounded frame with optional window chrome, a drop shadow, a
//! reflection, a frosted-glass halo and a positionable text overlay.
//!
//! # Example
//!
//! ```
//! use image::RgbaImage;
//! use mockup_renderer::{AspectRatio, MockupRenderer, RenderSettings, SourceImage, TextLayer};
//!
//! let mut renderer = MockupRenderer::new();
//! renderer.set_source(SourceImage::new(RgbaImage::new(640, 400))).unwrap();
//! renderer.set_settings(RenderSettings {
//!     padding: 80.0,
//!     window_chrome_enabled: true,
//!     aspect_ratio: AspectRatio::Square,
//!     ..RenderSettings::default()
//! });
//! renderer.set_text(Some(TextLayer::new("Launch day")));
//!
//! // Interactive preview: raster without text, plus where the text goes
//! let preview = renderer.compose_preview().unwrap();
//! assert_eq!(preview.raster.width(), preview.raster.height());
//!
//! // Export with the text burned in
//! let url = renderer.data_url().unwrap();
//! assert!(url.starts_with("data:image/png;base64,"));
//! assert!(!renderer.is_text_burned());
//! ```
//!
//! # Profiles
//!
//! Settings and text travel as JSON through [`MockupProfile`] and the
//! [`Configurable`] trait:
//!
//! ```
//! use mockup_renderer::{Configurable, MockupProfile, MockupRenderer};
//!
//! let profile = MockupProfile::from_json(r#"{ "settings": { "padding": 100 } }"#).unwrap();
//! let mut renderer = MockupRenderer::new();
//! renderer.apply_profile(&profile);
//!
//! let json = renderer.export_profile().to_json().unwrap();
//! assert!(json.contains("\"padding\":100.0"));
//! ```

mod error;
mod export;
mod font;
pub mod layer;
pub mod layout;
mod renderer;
mod settings;
mod source;

pub use error::{MockupError, MockupResult, SinkError};
pub use export::{ClipboardSink, EXPORT_FILE_NAME, ExportState};
pub use font::{FontBook, FontFamily, LoadedFont};
pub use layer::{CHROME_BAR_COLOR, TRAFFIC_LIGHTS, TextPlacement};
pub use layout::CanvasFrame;
pub use renderer::{Configurable, DEFAULT_CANVAS_WIDTH, MAX_CANVAS_PIXELS, MockupRenderer, Preview};
pub use settings::{
    AspectRatio, BACKGROUND_PRESETS, BackgroundPreset, BackgroundSpec, HexColor, MockupProfile,
    RenderSettings, ResolvedFill, TextDrag, TextLayer, background_presets,
};
pub use source::{RectF, SizePx, SourceImage};
