//! Page planning for paginated captures.

use scrollshot_render::{Point, Rect, Size};

use crate::error::{SnapshotError, SnapshotResult};

/// Most whole pages a single capture may plan.
pub const MAX_PAGE_COUNT: usize = 65_536;

/// How a content extent is split into viewport-sized pages.
///
/// The plan has `page_count = max(1, floor(extent / viewport))` pages and the
/// walk visits indices `0..=page_count`, so it always takes one more step than
/// there are whole pages. That last step covers any remainder; when the extent
/// divides evenly it renders past the end and draws only background.
///
/// # Example
///
/// ```
/// use scrollshot::PagePlan;
/// use scrollshot_render::{Point, Size};
///
/// let plan = PagePlan::new(1000.0, Size::new(320.0, 400.0)).unwrap();
/// assert_eq!(plan.page_count(), 2);
/// assert_eq!(plan.steps(), 3);
/// assert_eq!(plan.scroll_offset(2), Point::new(0.0, 800.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlan {
    extent_height: f32,
    viewport: Size,
    page_count: usize,
}

impl PagePlan {
    /// Plan a walk over `extent_height` with the given viewport.
    ///
    /// Fails with [`SnapshotError::EmptyViewport`] when the viewport has no
    /// positive height, and with [`SnapshotError::TooManyPages`] when the
    /// extent spans more than [`MAX_PAGE_COUNT`] viewports.
    pub fn new(extent_height: f32, viewport: Size) -> SnapshotResult<Self> {
        if viewport.height <= 0.0 || !viewport.height.is_finite() {
            return Err(SnapshotError::EmptyViewport {
                height: viewport.height,
            });
        }

        let whole_pages = (extent_height.max(0.0) / viewport.height).floor();
        if whole_pages > MAX_PAGE_COUNT as f32 {
            return Err(SnapshotError::TooManyPages {
                extent_height,
                viewport_height: viewport.height,
                limit: MAX_PAGE_COUNT,
            });
        }
        let page_count = (whole_pages as usize).max(1);

        Ok(Self {
            extent_height,
            viewport,
            page_count,
        })
    }

    /// Number of whole pages, never less than one.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of render steps the walk performs.
    pub fn steps(&self) -> usize {
        self.page_count.saturating_add(1)
    }

    /// Index of the last step.
    pub fn last_index(&self) -> usize {
        self.page_count
    }

    /// Height being planned over.
    pub fn extent_height(&self) -> f32 {
        self.extent_height
    }

    /// Viewport size used for every page.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Scroll offset for page `index`.
    pub fn scroll_offset(&self, index: usize) -> Point {
        Point::new(0.0, index as f32 * self.viewport.height)
    }

    /// Destination rectangle of page `index` in the output surface, shifted
    /// down by `delta`.
    pub fn page_frame(&self, index: usize, delta: f32) -> Rect {
        Rect::new(
            0.0,
            index as f32 * self.viewport.height + delta,
            self.viewport.width,
            self.viewport.height,
        )
    }
}
