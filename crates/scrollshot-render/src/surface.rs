//! Off-screen output surfaces that accumulate a capture.
//!
//! An [`OutputSurface`] is the raster every page of a capture is drawn into.
//! Surfaces are acquired through a [`SurfaceAllocator`], drawn through a
//! [`DrawContext`], and turned into an [`ImageBuffer`] exactly once, by
//! [`OutputSurface::finish`].
//!
//! # Example
//!
//! ```
//! use scrollshot_render::{Color, RasterAllocator, Rect, Size, SurfaceAllocator};
//!
//! let allocator = RasterAllocator::default();
//! let mut surface = allocator.allocate(Size::new(100.0, 60.0)).unwrap();
//!
//! let mut ctx = surface.context();
//! ctx.set_fill_color(Color::WHITE);
//! ctx.fill_all();
//! ctx.set_fill_color(Color::RED);
//! ctx.fill_rect(Rect::new(0.0, 0.0, 100.0, 10.0));
//!
//! let image = surface.finish();
//! assert_eq!(image.dimensions(), (100, 60));
//! assert_eq!(image.pixel_rgba8(50, 5), Some([255, 0, 0, 255]));
//! assert_eq!(image.pixel_rgba8(50, 30), Some([255, 255, 255, 255]));
//! ```

use image::{Rgba, RgbaImage};
use scrollshot_core::logging::targets;
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::image_buffer::ImageBuffer;
use crate::types::{Color, Point, Rect, Size};

/// Default upper bound on surface area: a 16384 x 16384 pixel raster.
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Acquires output surfaces for captures.
///
/// Allocation failure is reported as [`RenderError::SurfaceUnavailable`] and
/// is not expected to be transient; callers do not retry.
pub trait SurfaceAllocator {
    /// Acquire a surface of `size` points.
    fn allocate(&self, size: Size) -> RenderResult<OutputSurface>;
}

impl<A: SurfaceAllocator + ?Sized> SurfaceAllocator for &A {
    fn allocate(&self, size: Size) -> RenderResult<OutputSurface> {
        (**self).allocate(size)
    }
}

/// Allocates in-memory RGBA surfaces up to a pixel budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterAllocator {
    max_pixels: u64,
}

impl RasterAllocator {
    /// Create an allocator with the default pixel budget.
    pub const fn new() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }

    /// Set the maximum number of pixels a single surface may hold.
    pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Get the pixel budget.
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }
}

impl Default for RasterAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceAllocator for RasterAllocator {
    fn allocate(&self, size: Size) -> RenderResult<OutputSurface> {
        let (width, height) = pixel_extent(size);
        let pixels = width as u64 * height as u64;

        if width == 0 || height == 0 || pixels > self.max_pixels {
            debug!(
                target: targets::SURFACE,
                width,
                height,
                max_pixels = self.max_pixels,
                "surface allocation refused"
            );
            return Err(RenderError::SurfaceUnavailable { width, height });
        }

        Ok(OutputSurface::new(width, height))
    }
}

/// Convert a point size to whole pixels, rounding to nearest.
fn pixel_extent(size: Size) -> (u32, u32) {
    let to_pixels = |v: f32| {
        if v.is_finite() && v > 0.0 {
            v.round().min(u32::MAX as f32) as u32
        } else {
            0
        }
    };
    (to_pixels(size.width), to_pixels(size.height))
}

/// An off-screen RGBA raster target.
///
/// Surfaces start fully transparent; captures flood them with a background
/// color before drawing any content.
pub struct OutputSurface {
    pixels: RgbaImage,
    fill_color: Color,
    stroke_color: Color,
}

impl OutputSurface {
    /// Create a transparent surface. Prefer a [`SurfaceAllocator`].
    pub fn new(width: u32, height: u32) -> Self {
        info!(
            target: targets::SURFACE,
            width,
            height,
            "created output surface"
        );
        Self {
            pixels: RgbaImage::new(width, height),
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
        }
    }

    /// Get the surface width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Get the surface height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Get the surface size in points.
    pub fn size(&self) -> Size {
        Size::from(self.pixels.dimensions())
    }

    /// Bounds of the surface, at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size())
    }

    /// Borrow a drawing context for this surface.
    pub fn context(&mut self) -> DrawContext<'_> {
        DrawContext { surface: self }
    }

    /// Extract the composed image, consuming the surface.
    pub fn finish(self) -> ImageBuffer {
        debug!(
            target: targets::SURFACE,
            width = self.width(),
            height = self.height(),
            "extracted image from surface"
        );
        ImageBuffer::from_rgba_image(self.pixels)
    }
}

impl std::fmt::Debug for OutputSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSurface")
            .field("size", &(self.width(), self.height()))
            .field("fill_color", &self.fill_color)
            .field("stroke_color", &self.stroke_color)
            .finish()
    }
}

/// Drawing state and primitives for an [`OutputSurface`].
///
/// All drawing is clipped to the surface bounds. Rectangles are snapped
/// outward to whole pixels.
pub struct DrawContext<'a> {
    surface: &'a mut OutputSurface,
}

impl DrawContext<'_> {
    /// Size of the underlying surface in points.
    pub fn size(&self) -> Size {
        self.surface.size()
    }

    /// Bounds of the underlying surface.
    pub fn bounds(&self) -> Rect {
        self.surface.bounds()
    }

    /// Current fill color.
    pub fn fill_color(&self) -> Color {
        self.surface.fill_color
    }

    /// Set the fill color used by [`fill_rect`](Self::fill_rect).
    pub fn set_fill_color(&mut self, color: Color) {
        self.surface.fill_color = color;
    }

    /// Current stroke color.
    pub fn stroke_color(&self) -> Color {
        self.surface.stroke_color
    }

    /// Set the stroke color used by [`stroke_rect`](Self::stroke_rect).
    pub fn set_stroke_color(&mut self, color: Color) {
        self.surface.stroke_color = color;
    }

    /// Flood the whole surface with the fill color.
    pub fn fill_all(&mut self) {
        let bounds = self.bounds();
        self.fill_rect(bounds);
    }

    /// Fill a rectangle with the fill color, replacing what is underneath.
    pub fn fill_rect(&mut self, rect: Rect) {
        let color = self.surface.fill_color;
        self.fill_rect_with(rect, color);
    }

    /// Fill a rectangle with an explicit color, replacing what is underneath.
    pub fn fill_rect_with(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        let pixel = Rgba(color.to_rgba8());
        for y in y0..y1 {
            for x in x0..x1 {
                self.surface.pixels.put_pixel(x, y, pixel);
            }
        }
    }

    /// Outline a rectangle with the stroke color, drawing inside its edges.
    pub fn stroke_rect(&mut self, rect: Rect, line_width: f32) {
        let color = self.surface.stroke_color;
        let w = line_width.max(0.0).min(rect.width() / 2.0).min(rect.height() / 2.0);
        if w <= 0.0 {
            return;
        }
        self.fill_rect_with(Rect::new(rect.left(), rect.top(), rect.width(), w), color);
        self.fill_rect_with(
            Rect::new(rect.left(), rect.bottom() - w, rect.width(), w),
            color,
        );
        self.fill_rect_with(Rect::new(rect.left(), rect.top(), w, rect.height()), color);
        self.fill_rect_with(
            Rect::new(rect.right() - w, rect.top(), w, rect.height()),
            color,
        );
    }

    /// Alpha-blend an image with its top-left corner at `origin`.
    pub fn draw_image(&mut self, image: &ImageBuffer, origin: Point) {
        image::imageops::overlay(
            &mut self.surface.pixels,
            image.as_inner(),
            origin.x.round() as i64,
            origin.y.round() as i64,
        );
    }

    /// Clip `rect` to the surface and snap it to a pixel span `(x0, y0, x1, y1)`.
    fn pixel_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let clipped = rect.intersect(&self.bounds())?;
        let x0 = clipped.left().floor().max(0.0) as u32;
        let y0 = clipped.top().floor().max(0.0) as u32;
        let x1 = (clipped.right().ceil() as u32).min(self.surface.width());
        let y1 = (clipped.bottom().ceil() as u32).min(self.surface.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl std::fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawContext")
            .field("surface", &*self.surface)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_allocator_default() {
        let allocator = RasterAllocator::default();
        assert_eq!(allocator.max_pixels(), DEFAULT_MAX_SURFACE_PIXELS);
    }

    #[test]
    fn test_allocate_rounds_to_pixels() {
        let surface = RasterAllocator::new()
            .allocate(Size::new(99.6, 10.2))
            .unwrap();
        assert_eq!((surface.width(), surface.height()), (100, 10));
    }

    #[test]
    fn test_allocate_refuses_empty() {
        let err = RasterAllocator::new().allocate(Size::ZERO).unwrap_err();
        assert_eq!(
            err,
            RenderError::SurfaceUnavailable {
                width: 0,
                height: 0
            }
        );
        assert!(RasterAllocator::new()
            .allocate(Size::new(f32::NAN, 10.0))
            .is_err());
    }

    #[test]
    fn test_allocate_respects_budget() {
        let allocator = RasterAllocator::new().with_max_pixels(100 * 100);
        assert!(allocator.allocate(Size::new(100.0, 100.0)).is_ok());
        assert!(matches!(
            allocator.allocate(Size::new(100.0, 101.0)),
            Err(RenderError::SurfaceUnavailable {
                width: 100,
                height: 101
            })
        ));
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = OutputSurface::new(4, 4);
        let image = surface.finish();
        assert!(image.pixels().all(|(_, p)| p == [0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut surface = OutputSurface::new(10, 10);
        let mut ctx = surface.context();
        ctx.set_fill_color(Color::RED);
        ctx.fill_rect(Rect::new(-5.0, 8.0, 20.0, 20.0));

        let image = surface.finish();
        assert_eq!(image.pixel_rgba8(0, 8), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel_rgba8(9, 9), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel_rgba8(0, 7), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut surface = OutputSurface::new(10, 10);
        let mut ctx = surface.context();
        ctx.set_stroke_color(Color::BLUE);
        ctx.stroke_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);

        let image = surface.finish();
        assert_eq!(image.pixel_rgba8(0, 5), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel_rgba8(9, 9), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel_rgba8(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_image_at_origin() {
        let mut surface = OutputSurface::new(10, 10);
        let tile = ImageBuffer::from_color(3, 3, Color::GREEN);
        surface.context().draw_image(&tile, Point::new(7.0, 7.0));

        let image = surface.finish();
        assert_eq!(image.pixel_rgba8(9, 9), Some([0, 255, 0, 255]));
        assert_eq!(image.pixel_rgba8(6, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_context_colors() {
        let mut surface = OutputSurface::new(1, 1);
        let mut ctx = surface.context();
        ctx.set_fill_color(Color::YELLOW);
        ctx.set_stroke_color(Color::GRAY);
        assert_eq!(ctx.fill_color(), Color::YELLOW);
        assert_eq!(ctx.stroke_color(), Color::GRAY);
        assert_eq!(ctx.size(), Size::new(1.0, 1.0));
    }
}
