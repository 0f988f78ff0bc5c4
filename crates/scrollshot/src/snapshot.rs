//! Capture entry points.
//!
//! [`Snapshotter`] bundles a [`CaptureConfig`] with a [`SurfaceAllocator`]
//! and offers every way of capturing a container:
//!
//! | Operation | Passes | Mutates viewport |
//! |-----------|--------|------------------|
//! | [`capture_visible_region`](Snapshotter::capture_visible_region) | one | no |
//! | [`capture_content_rect`](Snapshotter::capture_content_rect) | one | no |
//! | [`capture_full_content`](Snapshotter::capture_full_content) | one | frame and offset, restored |
//! | [`capture_full_content_async`](Snapshotter::capture_full_content_async) | one per page | offset, restored |
//! | [`capture_partial_content_async`](Snapshotter::capture_partial_content_async) | one per page | offset, restored |

use std::time::Instant;

use scrollshot_core::logging::targets;
use scrollshot_render::{ImageBuffer, Point, RasterAllocator, Rect, SurfaceAllocator};
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::container::ScrollContainer;
use crate::error::SnapshotResult;
use crate::scheduler::{CaptureId, SnapshotScheduler};
use crate::viewport::{RestoreScope, ViewportGuard};
use crate::walker::{CompositionHook, PageWalker, WalkTarget};

/// Captures scroll containers into images.
///
/// # Example
///
/// ```
/// use scrollshot::{ScrollArea, ScrollContainer, Snapshotter};
/// use scrollshot_render::{Color, ImageBuffer, Point, Rect};
///
/// let document = ImageBuffer::from_color(200, 900, Color::BLUE);
/// let mut area = ScrollArea::new(Rect::new(0.0, 0.0, 200.0, 300.0), document);
/// area.scroll_to(0.0, 120.0);
///
/// let snapshotter = Snapshotter::new();
/// let image = snapshotter.capture_full_content(&mut area).unwrap();
///
/// assert_eq!(image.dimensions(), (200, 900));
/// assert_eq!(area.content_offset(), Point::new(0.0, 120.0));
/// ```
#[derive(Debug, Clone)]
pub struct Snapshotter<A: SurfaceAllocator = RasterAllocator> {
    config: CaptureConfig,
    allocator: A,
}

impl Snapshotter<RasterAllocator> {
    /// Create a snapshotter with default config and an in-memory allocator.
    pub fn new() -> Self {
        Self::with_config(CaptureConfig::default())
    }

    /// Create a snapshotter with the given config.
    pub fn with_config(config: CaptureConfig) -> Self {
        Self {
            config,
            allocator: RasterAllocator::default(),
        }
    }
}

impl Default for Snapshotter<RasterAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: SurfaceAllocator> Snapshotter<A> {
    /// Create a snapshotter that acquires surfaces from `allocator`.
    pub fn with_allocator(config: CaptureConfig, allocator: A) -> Self {
        Self { config, allocator }
    }

    /// The capture configuration.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Mutable access to the capture configuration.
    pub fn config_mut(&mut self) -> &mut CaptureConfig {
        &mut self.config
    }

    /// The surface allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    // =========================================================================
    // Single-pass captures
    // =========================================================================

    /// Capture what the container currently shows.
    ///
    /// The output has the viewport's size. No container state is changed.
    pub fn capture_visible_region<C>(&self, container: &mut C) -> SnapshotResult<ImageBuffer>
    where
        C: ScrollContainer + ?Sized,
    {
        let visible = Rect::from_origin_size(container.content_offset(), container.bounds_size());
        self.capture_content_rect(container, visible)
    }

    /// Capture `rect`, given in content coordinates, in one render pass.
    ///
    /// Only the part of `rect` inside the currently laid-out viewport has
    /// content; the rest stays background. No container state is changed.
    #[tracing::instrument(skip(self, container), target = "scrollshot::capture", level = "trace")]
    pub fn capture_content_rect<C>(&self, container: &mut C, rect: Rect) -> SnapshotResult<ImageBuffer>
    where
        C: ScrollContainer + ?Sized,
    {
        let mut surface = self.allocator.allocate(rect.size)?;
        let background = self.config.resolve_background(container.background_color());

        let offset = container.content_offset();
        let dest = Rect::from_origin_size(
            Point::new(offset.x - rect.left(), offset.y - rect.top()),
            container.bounds_size(),
        );

        {
            let mut ctx = surface.context();
            ctx.set_fill_color(background);
            ctx.set_stroke_color(background);
            ctx.fill_all();
            container.render(&mut ctx, dest);
        }

        let image = surface.finish();
        debug!(
            target: targets::CAPTURE,
            width = image.width(),
            height = image.height(),
            "content rect captured"
        );
        Ok(image)
    }

    /// Capture the whole content in one render pass.
    ///
    /// The frame is grown to the content size and the offset zeroed for the
    /// pass; both are restored before returning, including when the surface
    /// cannot be acquired.
    #[tracing::instrument(skip(self, container), target = "scrollshot::capture", level = "trace")]
    pub fn capture_full_content<C>(&self, container: &mut C) -> SnapshotResult<ImageBuffer>
    where
        C: ScrollContainer + ?Sized,
    {
        let mut guard = ViewportGuard::new(container, RestoreScope::FrameAndOffset);
        let content = guard.content_size();
        let origin = guard.original_frame().origin;

        guard.set_frame(Rect::from_origin_size(origin, content));
        guard.set_content_offset(Point::ZERO);
        guard.layout_if_needed();

        let mut surface = match self.allocator.allocate(content) {
            Ok(surface) => surface,
            Err(err) => {
                warn!(target: targets::CAPTURE, %err, "full content capture failed");
                return Err(err.into());
            }
        };
        let background = self.config.resolve_background(guard.background_color());

        {
            let mut ctx = surface.context();
            ctx.set_fill_color(background);
            ctx.set_stroke_color(background);
            ctx.fill_all();
            guard.render(&mut ctx, Rect::from_origin_size(Point::ZERO, content));
        }

        let image = surface.finish();
        info!(
            target: targets::CAPTURE,
            width = image.width(),
            height = image.height(),
            "full content captured"
        );
        Ok(image)
    }

    // =========================================================================
    // Paginated captures
    // =========================================================================

    /// Start a paginated walk over the whole content.
    ///
    /// The returned walker is driven by calling [`PageWalker::poll`].
    pub fn walk_full_content<'a, C>(
        &self,
        container: &'a mut C,
        now: Instant,
    ) -> SnapshotResult<PageWalker<'a, C>>
    where
        C: ScrollContainer + ?Sized,
    {
        PageWalker::start(
            container,
            WalkTarget::FullContent,
            None,
            &self.allocator,
            &self.config,
            now,
        )
    }

    /// Start a paginated walk over `region`.
    ///
    /// Only the region's size matters: the output is region-sized and page
    /// `i` is still sampled at scroll offset `(0, i * V)`. `hook` runs once,
    /// before the first page, and its return value shifts every page down.
    pub fn walk_partial_content<'a, C>(
        &self,
        container: &'a mut C,
        region: Rect,
        hook: Option<CompositionHook<'_>>,
        now: Instant,
    ) -> SnapshotResult<PageWalker<'a, C>>
    where
        C: ScrollContainer + ?Sized,
    {
        PageWalker::start(
            container,
            WalkTarget::Region(region),
            hook,
            &self.allocator,
            &self.config,
            now,
        )
    }

    /// Capture the whole content page by page on `scheduler`.
    ///
    /// `completion` runs exactly once: from a later
    /// [`SnapshotScheduler::process_expired`] call with the finished image,
    /// or right away, before this returns, if the walk cannot start. Returns
    /// the capture's ID when it was scheduled.
    pub fn capture_full_content_async<'a, C, F>(
        &self,
        scheduler: &mut SnapshotScheduler<'a>,
        container: &'a mut C,
        completion: F,
    ) -> Option<CaptureId>
    where
        C: ScrollContainer + ?Sized + 'a,
        F: FnOnce(SnapshotResult<ImageBuffer>) + 'a,
    {
        let now = Instant::now();
        match self.walk_full_content(container, now) {
            Ok(walker) => Some(scheduler.submit(walker, completion, now)),
            Err(err) => {
                warn!(target: targets::CAPTURE, %err, "paginated capture could not start");
                completion(Err(err));
                None
            }
        }
    }

    /// Capture `region` page by page on `scheduler`.
    ///
    /// Behaves like
    /// [`capture_full_content_async`](Self::capture_full_content_async), with
    /// the region and hook semantics of
    /// [`walk_partial_content`](Self::walk_partial_content).
    pub fn capture_partial_content_async<'a, C, F>(
        &self,
        scheduler: &mut SnapshotScheduler<'a>,
        container: &'a mut C,
        region: Rect,
        hook: Option<CompositionHook<'_>>,
        completion: F,
    ) -> Option<CaptureId>
    where
        C: ScrollContainer + ?Sized + 'a,
        F: FnOnce(SnapshotResult<ImageBuffer>) + 'a,
    {
        let now = Instant::now();
        match self.walk_partial_content(container, region, hook, now) {
            Ok(walker) => Some(scheduler.submit(walker, completion, now)),
            Err(err) => {
                warn!(target: targets::CAPTURE, %err, "paginated capture could not start");
                completion(Err(err));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll_area::ScrollArea;
    use scrollshot_render::{Color, Size};

    fn striped_area() -> ScrollArea {
        let mut document = ImageBuffer::from_color(40, 300, Color::WHITE);
        for y in 100..200 {
            for x in 0..40 {
                document.set_pixel(x, y, Color::RED);
            }
        }
        ScrollArea::new(Rect::new(0.0, 0.0, 40.0, 100.0), document)
    }

    #[test]
    fn test_visible_region() {
        let mut area = striped_area();
        area.scroll_to(0.0, 150.0);
        let image = Snapshotter::new().capture_visible_region(&mut area).unwrap();

        assert_eq!(image.dimensions(), (40, 100));
        assert_eq!(image.pixel_rgba8(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel_rgba8(0, 60), Some([255, 255, 255, 255]));
        assert_eq!(area.content_offset(), Point::new(0.0, 150.0));
    }

    #[test]
    fn test_content_rect_inside_viewport() {
        let mut area = striped_area();
        area.scroll_to(0.0, 100.0);
        let image = Snapshotter::new()
            .capture_content_rect(&mut area, Rect::new(10.0, 150.0, 20.0, 80.0))
            .unwrap();

        assert_eq!(image.dimensions(), (20, 80));
        assert_eq!(image.pixel_rgba8(5, 40), Some([255, 0, 0, 255]));
        // Rows 200.. lie below the viewport and keep the background.
        assert_eq!(image.pixel_rgba8(5, 60), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_full_content_single_pass() {
        let mut area = striped_area();
        area.scroll_to(0.0, 60.0);
        let image = Snapshotter::new().capture_full_content(&mut area).unwrap();

        assert_eq!(image.dimensions(), (40, 300));
        assert_eq!(image.pixel_rgba8(0, 150), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel_rgba8(0, 250), Some([255, 255, 255, 255]));
        assert_eq!(area.render_count(), 1);
        assert_eq!(area.frame(), Rect::new(0.0, 0.0, 40.0, 100.0));
        assert_eq!(area.content_offset(), Point::new(0.0, 60.0));
    }

    #[test]
    fn test_full_content_restores_on_surface_failure() {
        let mut area = striped_area().with_content_size(Size::new(40.0, 10_000.0));
        area.scroll_to(0.0, 60.0);
        let snapshotter = Snapshotter::with_allocator(
            CaptureConfig::default(),
            RasterAllocator::new().with_max_pixels(40 * 1000),
        );

        let err = snapshotter.capture_full_content(&mut area).unwrap_err();
        assert!(err.is_surface_unavailable());
        assert_eq!(area.render_count(), 0);
        assert_eq!(area.frame(), Rect::new(0.0, 0.0, 40.0, 100.0));
        assert_eq!(area.content_offset(), Point::new(0.0, 60.0));
    }
}
