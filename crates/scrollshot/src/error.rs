//! Error types for capture operations.

use std::time::Duration;

use scrollshot_render::RenderError;
use thiserror::Error;

/// Errors a capture can finish with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// Raster failure; [`RenderError::SurfaceUnavailable`] is the expected case.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The container's viewport has no height, so no page plan exists.
    #[error("viewport height must be positive, got {height}")]
    EmptyViewport { height: f32 },

    /// The extent would need more pages than a capture may plan.
    #[error(
        "extent {extent_height} needs more than {limit} pages of height {viewport_height}"
    )]
    TooManyPages {
        extent_height: f32,
        viewport_height: f32,
        limit: usize,
    },

    /// The capture's cancellation token fired between page steps.
    #[error("capture cancelled after {completed_pages} of {total_pages} pages")]
    Cancelled {
        completed_pages: usize,
        total_pages: usize,
    },

    /// The capture ran past its configured deadline.
    #[error("capture timed out after {0:?}")]
    Timeout(Duration),

    /// The walker was polled after delivering its result.
    #[error("capture already finished")]
    AlreadyFinished,
}

impl SnapshotError {
    /// Whether this is the surface-acquisition failure.
    pub fn is_surface_unavailable(&self) -> bool {
        matches!(self, Self::Render(RenderError::SurfaceUnavailable { .. }))
    }
}

/// Result type for capture operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
