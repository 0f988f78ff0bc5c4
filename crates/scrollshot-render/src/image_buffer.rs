//! CPU-side image buffer holding a finished capture.
//!
//! [`ImageBuffer`] wraps an 8-bit RGBA `image::RgbaImage`. Captures hand one
//! back once all pages have been composited; it can then be inspected pixel by
//! pixel, cropped, layered, encoded or written to disk.
//!
//! # Example
//!
//! ```
//! use scrollshot_render::{Color, ImageBuffer};
//!
//! let page = ImageBuffer::from_color(320, 400, Color::WHITE);
//! let header = ImageBuffer::from_color(320, 40, Color::BLUE);
//!
//! let composed = page.overlay(&header, 0, 0);
//! assert_eq!(composed.pixel_rgba8(0, 0), Some([0, 0, 255, 255]));
//! assert_eq!(composed.pixel_rgba8(0, 40), Some([255, 255, 255, 255]));
//!
//! let png = composed.to_png().unwrap();
//! assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
//! ```

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat as ImgFormat, Rgba, RgbaImage};
use scrollshot_core::logging::targets;

use crate::error::{RenderError, RenderResult};
use crate::types::{Color, Size};

/// Output format for image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy, alpha dropped).
    Jpeg,
    /// BMP format.
    Bmp,
}

impl OutputFormat {
    fn to_image_format(self) -> ImgFormat {
        match self {
            OutputFormat::Png => ImgFormat::Png,
            OutputFormat::Jpeg => ImgFormat::Jpeg,
            OutputFormat::Bmp => ImgFormat::Bmp,
        }
    }
}

/// An RGBA image buffer.
#[derive(Clone, PartialEq)]
pub struct ImageBuffer {
    inner: RgbaImage,
}

impl ImageBuffer {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Create a new transparent image with the specified dimensions.
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RgbaImage::new(width, height),
        }
    }

    /// Create an image filled with a solid color.
    pub fn from_color(width: u32, height: u32, color: Color) -> Self {
        Self {
            inner: RgbaImage::from_pixel(width, height, Rgba(color.to_rgba8())),
        }
    }

    /// Load an image from encoded bytes in memory.
    pub fn from_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| RenderError::ImageLoad(format!("Failed to decode image: {}", e)))?;
        Ok(Self {
            inner: img.into_rgba8(),
        })
    }

    /// Create an image from raw RGBA pixel data.
    ///
    /// The data must be exactly `width * height * 4` bytes, with pixels in
    /// row-major order, 4 bytes per pixel (R, G, B, A).
    pub fn from_rgba(data: &[u8], width: u32, height: u32) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        let inner = RgbaImage::from_raw(width, height, data.to_vec())
            .ok_or(RenderError::InvalidDimensions { width, height })?;
        Ok(Self { inner })
    }

    /// Wrap an existing `RgbaImage`.
    #[inline]
    pub fn from_rgba_image(inner: RgbaImage) -> Self {
        Self { inner }
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    /// Get the width of the image in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the height of the image in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Get the dimensions as a (width, height) tuple.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Get the size as a `Size` struct.
    #[inline]
    pub fn size(&self) -> Size {
        Size::from(self.dimensions())
    }

    // ========================================================================
    // PIXEL ACCESS
    // ========================================================================

    /// Get the color of a pixel at the specified coordinates.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixel_rgba8(x, y)
            .map(|[r, g, b, a]| Color::from_rgba8(r, g, b, a))
    }

    /// Get the raw 8-bit RGBA value of a pixel.
    pub fn pixel_rgba8(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.inner.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Set the color of a pixel. Does nothing if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(pixel) = self.inner.get_pixel_mut_checked(x, y) {
            *pixel = Rgba(color.to_rgba8());
        }
    }

    /// Iterate over all pixels as ((x, y), rgba) tuples.
    pub fn pixels(&self) -> impl Iterator<Item = ((u32, u32), [u8; 4])> + '_ {
        self.inner
            .enumerate_pixels()
            .map(|(x, y, pixel)| ((x, y), pixel.0))
    }

    /// Get the raw RGBA bytes.
    #[inline]
    pub fn as_rgba8_bytes(&self) -> &[u8] {
        self.inner.as_raw()
    }

    /// Get a reference to the underlying `RgbaImage`.
    #[inline]
    pub fn as_inner(&self) -> &RgbaImage {
        &self.inner
    }

    /// Consume this buffer and return the underlying `RgbaImage`.
    #[inline]
    pub fn into_inner(self) -> RgbaImage {
        self.inner
    }

    // ========================================================================
    // GEOMETRY & COMPOSITION
    // ========================================================================

    /// Crop a rectangular region from the image.
    ///
    /// Coordinates are clamped to the image bounds.
    #[must_use]
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            inner: image::imageops::crop_imm(&self.inner, x, y, width, height).to_image(),
        }
    }

    /// Overlay another image on top of this one with alpha blending.
    ///
    /// The overlay is placed at (x, y); parts falling outside are clipped.
    #[must_use]
    pub fn overlay(&self, other: &ImageBuffer, x: i64, y: i64) -> Self {
        let mut result = self.inner.clone();
        image::imageops::overlay(&mut result, &other.inner, x, y);
        Self { inner: result }
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    /// Save the image to a file. The format is determined by the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        let format = ImgFormat::from_path(path)
            .map_err(|e| RenderError::ImageSave(format!("Failed to save image: {}", e)))?;
        if format == ImgFormat::Jpeg {
            return self.save_with_format(path, OutputFormat::Jpeg);
        }
        self.inner
            .save(path)
            .map_err(|e| RenderError::ImageSave(format!("Failed to save image: {}", e)))?;

        tracing::debug!(
            target: targets::IMAGE_BUFFER,
            path = %path.display(),
            width = self.width(),
            height = self.height(),
            "saved image to file"
        );
        Ok(())
    }

    /// Save the image to a file with a specific format.
    pub fn save_with_format(&self, path: impl AsRef<Path>, format: OutputFormat) -> RenderResult<()> {
        let bytes = self.encode(format)?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| RenderError::ImageSave(format!("Failed to write image: {}", e)))
    }

    /// Encode the image to bytes in the specified format.
    pub fn encode(&self, format: OutputFormat) -> RenderResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let result = match format {
            // JPEG has no alpha channel.
            OutputFormat::Jpeg => DynamicImage::ImageRgba8(self.inner.clone())
                .to_rgb8()
                .write_to(&mut buffer, format.to_image_format()),
            _ => self.inner.write_to(&mut buffer, format.to_image_format()),
        };
        result.map_err(|e| RenderError::ImageSave(format!("Failed to encode image: {}", e)))?;
        Ok(buffer.into_inner())
    }

    /// Encode the image as PNG.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        self.encode(OutputFormat::Png)
    }
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_buffer_new() {
        let img = ImageBuffer::new(100, 50);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.dimensions(), (100, 50));
        assert_eq!(img.pixel_rgba8(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_image_buffer_from_color() {
        let img = ImageBuffer::from_color(10, 10, Color::RED);
        let pixel = img.get_pixel(5, 5).unwrap();
        assert!((pixel.r - 1.0).abs() < 0.01);
        assert!(pixel.g.abs() < 0.01);
        assert!(pixel.b.abs() < 0.01);
        assert!((pixel.a - 1.0).abs() < 0.01);
        assert!(img.get_pixel(10, 0).is_none());
    }

    #[test]
    fn test_from_rgba_validates_length() {
        assert!(ImageBuffer::from_rgba(&[0; 16], 2, 2).is_ok());
        assert_eq!(
            ImageBuffer::from_rgba(&[0; 15], 2, 2).unwrap_err(),
            RenderError::InvalidDimensions {
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn test_crop_clamps() {
        let img = ImageBuffer::from_color(100, 100, Color::RED);
        let cropped = img.crop(10, 20, 30, 40);
        assert_eq!(cropped.dimensions(), (30, 40));

        let clamped = img.crop(90, 90, 50, 50);
        assert_eq!(clamped.dimensions(), (10, 10));
    }

    #[test]
    fn test_overlay_clips() {
        let base = ImageBuffer::from_color(10, 10, Color::WHITE);
        let top = ImageBuffer::from_color(4, 4, Color::BLUE);
        let result = base.overlay(&top, 8, -2);

        assert_eq!(result.pixel_rgba8(9, 0), Some([0, 0, 255, 255]));
        assert_eq!(result.pixel_rgba8(9, 2), Some([255, 255, 255, 255]));
        assert_eq!(result.pixel_rgba8(7, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_set_pixel() {
        let mut img = ImageBuffer::new(5, 5);
        img.set_pixel(2, 3, Color::GREEN);
        img.set_pixel(50, 50, Color::GREEN);
        assert_eq!(img.pixel_rgba8(2, 3), Some([0, 255, 0, 255]));
        assert_eq!(img.pixels().filter(|(_, p)| p[3] != 0).count(), 1);
    }

    #[test]
    fn test_png_round_trip() {
        let img = ImageBuffer::from_color(8, 6, Color::from_rgb8(10, 20, 30));
        let decoded = ImageBuffer::from_bytes(&img.to_png().unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = ImageBuffer::from_color(8, 8, Color::GRAY);
        let bytes = img.encode(OutputFormat::Jpeg).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
    }
}
