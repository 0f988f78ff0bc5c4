//! In-memory scroll container.
//!
//! [`ScrollArea`] scrolls over a pre-rendered document image. It is the
//! reference [`ScrollContainer`]: headless tools can capture documents with it
//! directly, and it can simulate deferred layout so settle handling can be
//! exercised without a windowing system.
//!
//! # Example
//!
//! ```
//! use scrollshot::{ScrollArea, ScrollContainer};
//! use scrollshot_render::{Color, ImageBuffer, Point, Rect};
//!
//! let document = ImageBuffer::from_color(320, 1000, Color::WHITE);
//! let mut area = ScrollArea::new(Rect::new(0.0, 0.0, 320.0, 400.0), document)
//!     .with_background(Color::LIGHT_GRAY);
//!
//! area.scroll_to(0.0, 250.0);
//! assert_eq!(area.content_offset(), Point::new(0.0, 250.0));
//! assert_eq!(area.max_scroll_y(), 600.0);
//! assert_eq!(area.visible_content_rect(), Rect::new(0.0, 250.0, 320.0, 400.0));
//! ```

use scrollshot_core::logging::targets;
use scrollshot_render::{Color, DrawContext, ImageBuffer, Point, Rect, Size};
use tracing::trace;

use crate::container::ScrollContainer;

/// A scrollable viewport over a document image.
#[derive(Debug, Clone)]
pub struct ScrollArea {
    /// Frame in parent coordinates; its size is the viewport size.
    frame: Rect,

    /// Requested scroll offset.
    offset: Point,

    /// Offset the last completed layout pass used for drawing.
    laid_out_offset: Point,

    /// The scrollable content.
    document: ImageBuffer,

    /// Content size (total scrollable area).
    content_size: Size,

    /// Background drawn behind the document, if any.
    background: Option<Color>,

    /// Layout passes needed before a reposition becomes visible.
    layout_latency: u32,

    /// Layout passes still outstanding.
    pending_passes: u32,

    /// Whether [`ScrollContainer::is_layout_settled`] reports a signal.
    reports_layout: bool,

    /// Number of render calls served.
    render_count: usize,
}

impl ScrollArea {
    /// Create a scroll area showing `document` through `frame`.
    ///
    /// The content size defaults to the document's dimensions.
    pub fn new(frame: Rect, document: ImageBuffer) -> Self {
        let content_size = document.size();
        Self {
            frame,
            offset: Point::ZERO,
            laid_out_offset: Point::ZERO,
            document,
            content_size,
            background: None,
            layout_latency: 0,
            pending_passes: 0,
            reports_layout: false,
            render_count: 0,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Set the background color using builder pattern.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Set the content size using builder pattern.
    pub fn with_content_size(mut self, size: Size) -> Self {
        self.content_size = size;
        self
    }

    /// Defer repositions by `passes` layout passes.
    ///
    /// With `reports_settled` the area answers
    /// [`is_layout_settled`](ScrollContainer::is_layout_settled), running one
    /// pass per query. Without it the area reports no signal and repositions
    /// apply immediately.
    pub fn with_layout_latency(mut self, passes: u32, reports_settled: bool) -> Self {
        self.layout_latency = passes;
        self.reports_layout = reports_settled;
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// The document being scrolled.
    pub fn document(&self) -> &ImageBuffer {
        &self.document
    }

    /// Set the background color; `None` leaves areas outside the document
    /// untouched.
    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.background = color;
    }

    /// Set the content size.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
    }

    /// Number of render calls served so far.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    /// Offset currently used for drawing.
    pub fn laid_out_offset(&self) -> Point {
        self.laid_out_offset
    }

    // =========================================================================
    // Scroll Position
    // =========================================================================

    /// Scroll to a specific position.
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.set_content_offset(Point::new(x, y));
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_to(self.offset.x + dx, self.offset.y + dy);
    }

    /// Get the maximum horizontal scroll position.
    pub fn max_scroll_x(&self) -> f32 {
        (self.content_size.width - self.frame.width()).max(0.0)
    }

    /// Get the maximum vertical scroll position.
    pub fn max_scroll_y(&self) -> f32 {
        (self.content_size.height - self.frame.height()).max(0.0)
    }

    // =========================================================================
    // Viewport Geometry
    // =========================================================================

    /// Get the visible content rectangle in content coordinates.
    pub fn visible_content_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.frame.size)
    }

    /// Transform a content coordinate to viewport coordinate.
    pub fn content_to_viewport(&self, content_x: f32, content_y: f32) -> Point {
        Point::new(content_x - self.offset.x, content_y - self.offset.y)
    }

    /// Transform a viewport coordinate to content coordinate.
    pub fn viewport_to_content(&self, viewport_x: f32, viewport_y: f32) -> Point {
        Point::new(viewport_x + self.offset.x, viewport_y + self.offset.y)
    }

    fn finish_layout(&mut self) {
        self.pending_passes = 0;
        self.laid_out_offset = self.offset;
    }
}

impl ScrollContainer for ScrollArea {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn content_offset(&self) -> Point {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.offset = offset;
        if self.layout_latency == 0 {
            self.finish_layout();
        } else {
            self.pending_passes = self.layout_latency;
        }
    }

    fn content_size(&self) -> Size {
        self.content_size
    }

    fn background_color(&self) -> Option<Color> {
        self.background
    }

    fn render(&mut self, ctx: &mut DrawContext<'_>, dest: Rect) {
        self.render_count += 1;

        if let Some(background) = self.background {
            ctx.fill_rect_with(dest, background);
        }

        let window = Rect::from_origin_size(self.laid_out_offset, dest.size);
        let document_bounds = Rect::from_origin_size(Point::ZERO, self.document.size());
        let Some(visible) = window.intersect(&document_bounds) else {
            trace!(target: targets::SCROLL_AREA, ?window, "viewport outside document");
            return;
        };

        let tile = self.document.crop(
            visible.left().round() as u32,
            visible.top().round() as u32,
            visible.width().round() as u32,
            visible.height().round() as u32,
        );
        let origin = Point::new(
            dest.left() + (visible.left() - window.left()),
            dest.top() + (visible.top() - window.top()),
        );
        ctx.draw_image(&tile, origin);

        trace!(
            target: targets::SCROLL_AREA,
            ?window,
            ?dest,
            "rendered viewport"
        );
    }

    fn layout_if_needed(&mut self) {
        self.finish_layout();
    }

    fn is_layout_settled(&mut self) -> Option<bool> {
        if !self.reports_layout {
            if self.pending_passes > 0 {
                self.finish_layout();
            }
            return None;
        }
        if self.pending_passes > 0 {
            self.pending_passes -= 1;
            if self.pending_passes == 0 {
                self.finish_layout();
            }
        }
        Some(self.pending_passes == 0)
    }
}
