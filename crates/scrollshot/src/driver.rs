//! Tokio driver for paginated captures.
//!
//! Instead of a [`SnapshotScheduler`](crate::SnapshotScheduler) and a
//! completion callback, these methods await the tokio timer between page
//! steps and return the image. They read the clock through
//! [`tokio::time::Instant`], so paused test time drives them too.
//!
//! The futures are not `Send` unless the container is; run them on a
//! current-thread runtime or a `LocalSet` on the thread that owns the
//! container.

use std::sync::Arc;

use scrollshot_core::CancellationToken;
use scrollshot_core::logging::{span_names, targets};
use scrollshot_render::{ImageBuffer, Rect, SurfaceAllocator};
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{Instrument, trace};

use crate::container::ScrollContainer;
use crate::error::SnapshotResult;
use crate::snapshot::Snapshotter;
use crate::walker::{CompositionHook, PageWalker, WalkPoll};

impl<A: SurfaceAllocator> Snapshotter<A> {
    /// Capture the whole content page by page, awaiting each settle wait.
    ///
    /// # Example
    ///
    /// ```
    /// use scrollshot::{ScrollArea, Snapshotter};
    /// use scrollshot_render::{Color, ImageBuffer, Rect};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let mut area = ScrollArea::new(
    ///     Rect::new(0.0, 0.0, 64.0, 100.0),
    ///     ImageBuffer::from_color(64, 180, Color::YELLOW),
    /// );
    /// let image = Snapshotter::new()
    ///     .capture_full_content_future(&mut area)
    ///     .await
    ///     .unwrap();
    /// assert_eq!(image.dimensions(), (64, 180));
    /// # }
    /// ```
    pub async fn capture_full_content_future<C>(&self, container: &mut C) -> SnapshotResult<ImageBuffer>
    where
        C: ScrollContainer + ?Sized,
    {
        let walker = self.walk_full_content(container, Instant::now().into_std())?;
        let span = tracing::debug_span!(target: targets::CAPTURE, span_names::CAPTURE, kind = "full");
        drive(walker, self.config().cancellation.clone())
            .instrument(span)
            .await
    }

    /// Capture `region` page by page, awaiting each settle wait.
    ///
    /// See [`walk_partial_content`](Self::walk_partial_content) for the
    /// region and hook semantics.
    pub async fn capture_partial_content_future<C>(
        &self,
        container: &mut C,
        region: Rect,
        hook: Option<CompositionHook<'_>>,
    ) -> SnapshotResult<ImageBuffer>
    where
        C: ScrollContainer + ?Sized,
    {
        let walker =
            self.walk_partial_content(container, region, hook, Instant::now().into_std())?;
        let span = tracing::debug_span!(target: targets::CAPTURE, span_names::CAPTURE, kind = "partial");
        drive(walker, self.config().cancellation.clone())
            .instrument(span)
            .await
    }
}

/// Poll `walker` until it finishes, sleeping until each requested wake-up or
/// until the token is cancelled, whichever comes first.
async fn drive<C>(
    mut walker: PageWalker<'_, C>,
    cancellation: Option<CancellationToken>,
) -> SnapshotResult<ImageBuffer>
where
    C: ScrollContainer + ?Sized,
{
    let cancelled = Arc::new(Notify::new());
    // Deregistered when the capture returns.
    let _registration = cancellation.as_ref().map(|token| {
        let cancelled = Arc::clone(&cancelled);
        token.on_cancel(move || cancelled.notify_one())
    });

    loop {
        match walker.poll(Instant::now().into_std()) {
            WalkPoll::Ready(result) => return result,
            WalkPoll::Pending { wake_at } => {
                trace!(target: targets::WALKER, ?wake_at, "awaiting settle");
                tokio::select! {
                    _ = tokio::time::sleep_until(Instant::from_std(wake_at)) => {}
                    _ = cancelled.notified() => {}
                }
            }
        }
    }
}
