//! Error types for the mockup renderer.

use std::path::PathBuf;

/// Boxed error returned by caller-supplied sinks such as the clipboard.
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for rendering and export operations.
///
/// Only operations whose result is consumed by the caller surface errors.
/// Decorative failures (reflection buffer, missing font) are logged and
/// the render carries on without the effect.
#[derive(Debug, thiserror::Error)]
pub enum MockupError {
    #[error("Resource unavailable: {message}")]
    ResourceUnavailable { message: String },

    #[error("Offscreen buffer unavailable ({width}x{height})")]
    OffscreenUnavailable { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Clipboard write failed: {source}")]
    ClipboardWrite {
        #[source]
        source: SinkError,
    },

    #[error("Invalid colour {value:?}: expected #rgb or #rrggbb")]
    InvalidColor { value: String },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using [`MockupError`].
pub type MockupResult<T> = Result<T, MockupError>;

impl MockupError {
    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn offscreen(width: u32, height: u32) -> Self {
        Self::OffscreenUnavailable { width, height }
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font {
            message: msg.into(),
        }
    }

    pub fn clipboard(source: impl Into<SinkError>) -> Self {
        Self::ClipboardWrite {
            source: source.into(),
        }
    }
}
