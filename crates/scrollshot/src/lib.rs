//! Scrollshot: capture scrollable containers into a single image.
//!
//! Content taller than its viewport cannot be rendered in one pass without
//! reframing the container. Scrollshot offers both ways of capturing it:
//!
//! - **Single pass**: [`Snapshotter::capture_full_content`] grows the
//!   container's frame to the content size, renders once and puts the frame
//!   back. [`Snapshotter::capture_visible_region`] renders just what is on
//!   screen.
//! - **Paginated**: a [`PageWalker`] scrolls one viewport at a time, waits for
//!   each reposition to settle and composites every page into one surface.
//!   Walks run on a [`SnapshotScheduler`], or on tokio with the `tokio`
//!   feature.
//!
//! Every capture restores the container's viewport before it reports a
//! result, whether it succeeded, failed or was cancelled.
//!
//! # Implementing a container
//!
//! Captures work with anything implementing [`ScrollContainer`]. The
//! [`ScrollArea`] shipped here scrolls over an in-memory document image.
//!
//! # Paginated capture
//!
//! ```
//! use std::time::Instant;
//! use scrollshot::{CaptureConfig, ScrollArea, Snapshotter, WalkPoll};
//! use scrollshot_render::{Color, ImageBuffer, Rect};
//!
//! let mut area = ScrollArea::new(
//!     Rect::new(0.0, 0.0, 100.0, 400.0),
//!     ImageBuffer::from_color(100, 1000, Color::GRAY),
//! );
//!
//! let snapshotter = Snapshotter::with_config(CaptureConfig::default());
//! let mut now = Instant::now();
//! let mut walker = snapshotter.walk_full_content(&mut area, now).unwrap();
//! assert_eq!(walker.plan().page_count(), 2);
//!
//! let image = loop {
//!     match walker.poll(now) {
//!         WalkPoll::Pending { wake_at } => now = wake_at,
//!         WalkPoll::Ready(result) => break result.unwrap(),
//!     }
//! };
//! assert_eq!(image.dimensions(), (100, 1000));
//! ```
//!
//! # Logging
//!
//! Every module logs through `tracing` under the targets listed in
//! [`scrollshot_core::logging::targets`].

mod config;
mod container;
#[cfg(feature = "tokio")]
mod driver;
mod error;
mod plan;
mod scheduler;
mod scroll_area;
mod snapshot;
mod viewport;
mod walker;

pub use config::{
    CaptureConfig, DEFAULT_SETTLE_DELAY, DEFAULT_SETTLE_POLL_INTERVAL, DEFAULT_SETTLE_TIMEOUT,
};
pub use container::ScrollContainer;
pub use error::{SnapshotError, SnapshotResult};
pub use plan::{MAX_PAGE_COUNT, PagePlan};
pub use scheduler::{CaptureId, SnapshotScheduler};
pub use scroll_area::ScrollArea;
pub use snapshot::Snapshotter;
pub use viewport::{RestoreScope, ViewportGuard};
pub use walker::{CompositionHook, PageWalker, Walk, WalkPhase, WalkPoll, WalkTarget};

pub use scrollshot_core::CancellationToken;
