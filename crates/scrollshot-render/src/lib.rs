//! Raster backend for Scrollshot.
//!
//! This crate owns everything a capture draws into and hands back:
//!
//! - [`OutputSurface`] / [`DrawContext`]: the off-screen raster a capture
//!   composites its pages into, with fill/stroke state
//! - [`SurfaceAllocator`] / [`RasterAllocator`]: surface acquisition, the one
//!   place a capture can fail with [`RenderError::SurfaceUnavailable`]
//! - [`ImageBuffer`]: the finished RGBA image, with pixel access and encoding
//! - Geometry and color types shared by the whole workspace
//!
//! # Example
//!
//! ```
//! use scrollshot_render::{Color, ImageBuffer, Point, RasterAllocator, Size, SurfaceAllocator};
//!
//! let mut surface = RasterAllocator::default().allocate(Size::new(64.0, 128.0))?;
//! let mut ctx = surface.context();
//! ctx.set_fill_color(Color::WHITE);
//! ctx.fill_all();
//!
//! // Composite a 64x64 "page" into the lower half.
//! let page = ImageBuffer::from_color(64, 64, Color::BLUE);
//! ctx.draw_image(&page, Point::new(0.0, 64.0));
//!
//! let image = surface.finish();
//! assert_eq!(image.pixel_rgba8(0, 0), Some([255, 255, 255, 255]));
//! assert_eq!(image.pixel_rgba8(0, 100), Some([0, 0, 255, 255]));
//! # Ok::<(), scrollshot_render::RenderError>(())
//! ```

mod error;
mod image_buffer;
mod surface;
mod types;

pub use error::{RenderError, RenderResult};
pub use image_buffer::{ImageBuffer, OutputFormat};
pub use surface::{
    DEFAULT_MAX_SURFACE_PIXELS, DrawContext, OutputSurface, RasterAllocator, SurfaceAllocator,
};
pub use types::{Color, Point, Rect, Size};
