//! Source image and geometry types.
//!
//! The engine never owns image acquisition: callers decode an upload or a
//! paste into a [`SourceImage`] and hand it over read-only.

use std::path::Path;

use image::RgbaImage;

use crate::error::MockupResult;

/// A rectangle in canvas pixel coordinates.
///
/// Layout works in fractional pixels, so unlike the integer raster sizes
/// this carries `f32` edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle starting at origin (0, 0) with the given dimensions.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Returns true if the point lies inside the rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// An immutable decoded raster supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    data: RgbaImage,
}

impl SourceImage {
    pub fn new(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Decodes an encoded image (PNG, JPEG, WebP, ...) from memory.
    pub fn from_bytes(bytes: &[u8]) -> MockupResult<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::new(img))
    }

    /// Decodes an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> MockupResult<Self> {
        let img = image::open(path)?.to_rgba8();
        Ok(Self::new(img))
    }

    /// Returns the natural pixel dimensions.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_expand() {
        let rect = RectF::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 220.0);

        let grown = rect.expand(5.0);
        assert_eq!(grown, RectF::new(5.0, 15.0, 110.0, 210.0));
        assert!(grown.contains(6.0, 16.0));
        assert!(!grown.contains(115.0, 16.0));
    }

    #[test]
    fn source_dimensions() {
        let src = SourceImage::new(RgbaImage::new(64, 32));
        assert_eq!(src.dimensions(), SizePx::new(64, 32));
        assert_eq!(src.dimensions().area(), 2048);
    }

    #[test]
    fn source_decodes_png_bytes() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let src = SourceImage::from_bytes(buf.get_ref()).unwrap();
        assert_eq!(src.dimensions(), SizePx::new(3, 2));
        assert_eq!(src.pixels().get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn source_rejects_garbage() {
        assert!(SourceImage::from_bytes(b"not an image").is_err());
    }
}
