//! Scoped save/restore of a container's viewport state.

use std::ops::{Deref, DerefMut};

use scrollshot_core::logging::targets;
use scrollshot_render::{Point, Rect};
use tracing::trace;

use crate::container::ScrollContainer;

/// Which parts of the viewport a [`ViewportGuard`] restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreScope {
    /// Restore the scroll offset only.
    Offset,
    /// Restore the frame, then the scroll offset.
    FrameAndOffset,
}

/// Exclusive access to a container for the length of one capture.
///
/// The guard snapshots the frame and scroll offset when created and puts
/// them back when dropped, on success, error and cancellation alike. Because
/// it holds the container's `&mut` borrow, a second capture of the same
/// container cannot start while this one is alive.
pub struct ViewportGuard<'a, C: ScrollContainer + ?Sized> {
    container: &'a mut C,
    frame: Rect,
    offset: Point,
    scope: RestoreScope,
}

impl<'a, C: ScrollContainer + ?Sized> ViewportGuard<'a, C> {
    /// Snapshot the container's viewport state.
    pub fn new(container: &'a mut C, scope: RestoreScope) -> Self {
        let frame = container.frame();
        let offset = container.content_offset();
        trace!(
            target: targets::VIEWPORT,
            ?frame,
            ?offset,
            ?scope,
            "viewport saved"
        );
        Self {
            container,
            frame,
            offset,
            scope,
        }
    }

    /// Frame at the time the guard was created.
    pub fn original_frame(&self) -> Rect {
        self.frame
    }

    /// Scroll offset at the time the guard was created.
    pub fn original_offset(&self) -> Point {
        self.offset
    }
}

impl<C: ScrollContainer + ?Sized> Deref for ViewportGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.container
    }
}

impl<C: ScrollContainer + ?Sized> DerefMut for ViewportGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.container
    }
}

impl<C: ScrollContainer + ?Sized> Drop for ViewportGuard<'_, C> {
    fn drop(&mut self) {
        if self.scope == RestoreScope::FrameAndOffset {
            self.container.set_frame(self.frame);
        }
        self.container.set_content_offset(self.offset);
        trace!(
            target: targets::VIEWPORT,
            frame = ?self.frame,
            offset = ?self.offset,
            "viewport restored"
        );
    }
}

impl<C: ScrollContainer + ?Sized> std::fmt::Debug for ViewportGuard<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportGuard")
            .field("frame", &self.frame)
            .field("offset", &self.offset)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll_area::ScrollArea;
    use scrollshot_render::{Color, ImageBuffer, Size};

    fn area() -> ScrollArea {
        ScrollArea::new(
            Rect::new(5.0, 5.0, 100.0, 100.0),
            ImageBuffer::from_color(100, 500, Color::WHITE),
        )
    }

    #[test]
    fn test_restores_offset_on_drop() {
        let mut area = area();
        area.set_content_offset(Point::new(0.0, 40.0));
        {
            let mut guard = ViewportGuard::new(&mut area, RestoreScope::Offset);
            guard.set_content_offset(Point::new(0.0, 300.0));
            assert_eq!(guard.original_offset(), Point::new(0.0, 40.0));
        }
        assert_eq!(area.content_offset(), Point::new(0.0, 40.0));
    }

    #[test]
    fn test_restores_frame_when_scoped() {
        let mut area = area();
        {
            let mut guard = ViewportGuard::new(&mut area, RestoreScope::FrameAndOffset);
            let content = guard.content_size();
            let origin = guard.original_frame().origin;
            guard.set_frame(Rect::from_origin_size(origin, content));
        }
        assert_eq!(area.frame(), Rect::new(5.0, 5.0, 100.0, 100.0));
    }

    #[test]
    fn test_offset_scope_keeps_frame_changes() {
        let mut area = area();
        {
            let mut guard = ViewportGuard::new(&mut area, RestoreScope::Offset);
            guard.set_frame(Rect::new(0.0, 0.0, 50.0, 50.0));
        }
        assert_eq!(area.bounds_size(), Size::new(50.0, 50.0));
    }
}
