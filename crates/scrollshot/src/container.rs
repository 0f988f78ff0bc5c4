//! The scrollable container a capture operates on.

use scrollshot_render::{Color, DrawContext, Point, Rect, Size};

/// A scrollable container that can draw its laid-out viewport.
///
/// Captures mutate the frame and scroll offset through this trait and always
/// restore them before finishing. All methods are called from the thread that
/// owns the container.
pub trait ScrollContainer {
    /// The container's frame in its parent's coordinates.
    fn frame(&self) -> Rect;

    /// Move or resize the container.
    fn set_frame(&mut self, frame: Rect);

    /// Size of the visible viewport.
    fn bounds_size(&self) -> Size {
        self.frame().size
    }

    /// Current scroll offset, in content coordinates.
    fn content_offset(&self) -> Point;

    /// Scroll to `offset` without animation. Offsets are not clamped.
    fn set_content_offset(&mut self, offset: Point);

    /// Total size of the scrollable content.
    fn content_size(&self) -> Size;

    /// Configured background color, if any.
    fn background_color(&self) -> Option<Color>;

    /// Draw the currently laid-out viewport into `dest` of `ctx`.
    ///
    /// `dest` has the size of [`bounds_size`](Self::bounds_size); its origin
    /// may lie outside the surface, in which case drawing is clipped.
    fn render(&mut self, ctx: &mut DrawContext<'_>, dest: Rect);

    /// Apply any pending layout immediately.
    ///
    /// Called by single-shot captures before their one render pass.
    fn layout_if_needed(&mut self) {}

    /// Report whether layout has caught up with the last reposition.
    ///
    /// `None` means the container has no such signal and captures fall back
    /// to a fixed settle delay. May advance the container's layout as a side
    /// effect.
    fn is_layout_settled(&mut self) -> Option<bool> {
        None
    }
}
