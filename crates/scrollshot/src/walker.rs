//! The paginated capture state machine.
//!
//! A [`PageWalker`] scrolls a container one viewport at a time, waits for
//! each reposition to settle, and renders every page into a shared output
//! surface. It never sleeps: whoever drives it calls [`PageWalker::poll`]
//! with the current instant and gets back either the instant it next wants
//! to be polled at or the finished capture.
//!
//! ```text
//! start ──► Walking(0) ──► Walking(1) ──► … ──► Walking(page_count) ──► Finalizing ──► Done
//!              │ settle        │ settle                  │ settle
//!              ▼               ▼                         ▼
//!           render          render                    render
//! ```
//!
//! Cancellation and the overall deadline are checked at the top of every
//! poll. Whatever way the walk ends, the container's scroll offset is put
//! back before the result is handed out.

use std::time::{Duration, Instant};

use scrollshot_core::logging::{span_names, targets};
use scrollshot_render::{DrawContext, ImageBuffer, OutputSurface, Rect, Size, SurfaceAllocator};
use tracing::{debug, info, trace, warn};

use crate::config::CaptureConfig;
use crate::container::ScrollContainer;
use crate::error::{SnapshotError, SnapshotResult};
use crate::plan::PagePlan;
use crate::viewport::{RestoreScope, ViewportGuard};

/// Hook run once before walking, with the background already filled.
///
/// It may draw into the surface and returns the vertical offset added to
/// every page frame.
pub type CompositionHook<'h> = Box<dyn FnOnce(&mut DrawContext<'_>) -> f32 + 'h>;

/// What a paginated capture covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkTarget {
    /// The container's whole content extent.
    FullContent,
    /// A caller-chosen region. Its size bounds the output surface and the
    /// page plan; pages are always sampled from scroll offset `(0, i * V)`.
    Region(Rect),
}

/// Result of polling a walker.
#[derive(Debug)]
pub enum WalkPoll {
    /// Poll again at `wake_at`.
    Pending { wake_at: Instant },
    /// The walk finished; the viewport has been restored.
    Ready(SnapshotResult<ImageBuffer>),
}

/// Where a walker currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    /// Waiting to render page `index`.
    Walking(usize),
    /// The last page is rendered and the image is being extracted.
    Finalizing,
    /// The result has been handed out.
    Done,
}

#[derive(Debug, Clone, Copy)]
enum WalkState {
    Walking { index: usize, positioned_at: Instant },
    Finalizing,
    Done,
}

/// Outcome of checking whether the current page may be rendered.
enum Settle {
    Ready,
    Wait(Instant),
}

/// A paginated capture in progress.
///
/// Holds the container's `&mut` borrow for its whole lifetime, so the
/// container cannot be touched by anything else until the walk ends.
/// Dropping an unfinished walker restores the viewport and discards the
/// partial surface.
pub struct PageWalker<'a, C: ScrollContainer + ?Sized> {
    guard: Option<ViewportGuard<'a, C>>,
    surface: Option<OutputSurface>,
    plan: PagePlan,
    delta: f32,
    config: CaptureConfig,
    state: WalkState,
    started_at: Instant,
    completed: usize,
}

impl<'a, C: ScrollContainer + ?Sized> PageWalker<'a, C> {
    /// Plan the walk, acquire the surface and position the first page.
    ///
    /// On error nothing has been rendered and the viewport is untouched.
    /// `hook` runs exactly once, after the background fill and before any
    /// page is positioned.
    pub fn start<A: SurfaceAllocator + ?Sized>(
        container: &'a mut C,
        target: WalkTarget,
        hook: Option<CompositionHook<'_>>,
        allocator: &A,
        config: &CaptureConfig,
        now: Instant,
    ) -> SnapshotResult<Self> {
        let mut guard = ViewportGuard::new(container, RestoreScope::Offset);

        let extent = match target {
            WalkTarget::FullContent => guard.content_size(),
            WalkTarget::Region(region) => region.size,
        };
        let viewport = guard.bounds_size();
        let plan = PagePlan::new(extent.height, viewport)?;

        let mut surface = allocator.allocate(extent)?;
        let background = config.resolve_background(guard.background_color());

        let delta = {
            let mut ctx = surface.context();
            ctx.set_fill_color(background);
            ctx.set_stroke_color(background);
            ctx.fill_all();
            hook.map_or(0.0, |hook| hook(&mut ctx))
        };

        debug!(
            target: targets::WALKER,
            ?target,
            page_count = plan.page_count(),
            viewport_height = viewport.height,
            delta,
            "walk started"
        );

        guard.set_content_offset(plan.scroll_offset(0));

        Ok(Self {
            guard: Some(guard),
            surface: Some(surface),
            plan,
            delta,
            config: config.clone(),
            state: WalkState::Walking {
                index: 0,
                positioned_at: now,
            },
            started_at: now,
            completed: 0,
        })
    }

    /// The page plan this walk follows.
    pub fn plan(&self) -> &PagePlan {
        &self.plan
    }

    /// Vertical shift applied to every page frame.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Size of the output image.
    pub fn output_size(&self) -> Option<Size> {
        self.surface.as_ref().map(OutputSurface::size)
    }

    /// Pages rendered so far and the total number of render steps.
    pub fn progress(&self) -> (usize, usize) {
        (self.completed, self.plan.steps())
    }

    /// Current phase.
    pub fn phase(&self) -> WalkPhase {
        match self.state {
            WalkState::Walking { index, .. } => WalkPhase::Walking(index),
            WalkState::Finalizing => WalkPhase::Finalizing,
            WalkState::Done => WalkPhase::Done,
        }
    }

    /// Whether the result has been handed out.
    pub fn is_done(&self) -> bool {
        matches!(self.state, WalkState::Done)
    }

    /// Advance the walk as far as it can go at `now`.
    ///
    /// Renders every page whose settle condition holds, then either returns
    /// the instant to poll again at or the finished capture. Polling a walker
    /// that already finished yields [`SnapshotError::AlreadyFinished`].
    #[tracing::instrument(skip(self), target = "scrollshot::walker", level = "trace")]
    pub fn poll(&mut self, now: Instant) -> WalkPoll {
        loop {
            if let WalkState::Done = self.state {
                return WalkPoll::Ready(Err(SnapshotError::AlreadyFinished));
            }

            if self.is_cancel_requested() {
                warn!(
                    target: targets::WALKER,
                    completed = self.completed,
                    total = self.plan.steps(),
                    "capture cancelled"
                );
                let err = self.cancelled_error();
                return WalkPoll::Ready(self.fail(err));
            }

            if let Some(limit) = self.config.deadline
                && now.saturating_duration_since(self.started_at) >= limit
            {
                warn!(
                    target: targets::WALKER,
                    ?limit,
                    completed = self.completed,
                    "capture deadline exceeded"
                );
                return WalkPoll::Ready(self.fail(SnapshotError::Timeout(limit)));
            }

            match self.state {
                WalkState::Walking {
                    index,
                    positioned_at,
                } => match self.settle(now, positioned_at) {
                    Settle::Wait(wake_at) => {
                        return WalkPoll::Pending {
                            wake_at: self.clamp_to_deadline(wake_at),
                        };
                    }
                    Settle::Ready => {
                        self.render_page(index);
                        if index == self.plan.last_index() {
                            self.state = WalkState::Finalizing;
                        } else {
                            self.position_page(index + 1, now);
                        }
                    }
                },
                WalkState::Finalizing => return WalkPoll::Ready(self.finalize(now)),
                WalkState::Done => {}
            }
        }
    }

    /// Stop the walk now.
    ///
    /// Restores the viewport, discards the partial surface and returns the
    /// [`SnapshotError::Cancelled`] the walk ends with, or `None` if it had
    /// already finished.
    pub fn cancel(&mut self) -> Option<SnapshotError> {
        if self.is_done() {
            return None;
        }
        let err = self.cancelled_error();
        debug!(
            target: targets::WALKER,
            completed = self.completed,
            "walk cancelled by caller"
        );
        self.fail(err).err()
    }

    fn is_cancel_requested(&self) -> bool {
        self.config
            .cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    fn cancelled_error(&self) -> SnapshotError {
        SnapshotError::Cancelled {
            completed_pages: self.completed,
            total_pages: self.plan.steps(),
        }
    }

    fn settle(&mut self, now: Instant, positioned_at: Instant) -> Settle {
        let Some(guard) = self.guard.as_mut() else {
            return Settle::Ready;
        };
        let waited = now.saturating_duration_since(positioned_at);

        match guard.is_layout_settled() {
            Some(true) => Settle::Ready,
            Some(false) if waited >= self.config.settle_timeout => {
                warn!(
                    target: targets::WALKER,
                    ?waited,
                    "layout did not settle in time; rendering anyway"
                );
                Settle::Ready
            }
            Some(false) => {
                let give_up = positioned_at + self.config.settle_timeout;
                let next_check = now + self.config.settle_poll_interval.max(Duration::from_millis(1));
                Settle::Wait(next_check.min(give_up))
            }
            None if waited >= self.config.settle_delay => Settle::Ready,
            None => Settle::Wait(positioned_at + self.config.settle_delay),
        }
    }

    fn clamp_to_deadline(&self, wake_at: Instant) -> Instant {
        self.config
            .deadline
            .and_then(|limit| self.started_at.checked_add(limit))
            .map_or(wake_at, |deadline| wake_at.min(deadline))
    }

    fn render_page(&mut self, index: usize) {
        let _page = tracing::trace_span!(target: targets::WALKER, span_names::PAGE, index).entered();
        let frame = self.plan.page_frame(index, self.delta);
        if let (Some(guard), Some(surface)) = (self.guard.as_mut(), self.surface.as_mut()) {
            let mut ctx = surface.context();
            guard.render(&mut ctx, frame);
        }
        self.completed += 1;
        debug!(
            target: targets::WALKER,
            page = index,
            frame_y = frame.top(),
            "page rendered"
        );
    }

    fn position_page(&mut self, index: usize, now: Instant) {
        let offset = self.plan.scroll_offset(index);
        if let Some(guard) = self.guard.as_mut() {
            guard.set_content_offset(offset);
        }
        trace!(target: targets::WALKER, page = index, offset_y = offset.y, "page positioned");
        self.state = WalkState::Walking {
            index,
            positioned_at: now,
        };
    }

    fn finalize(&mut self, now: Instant) -> SnapshotResult<ImageBuffer> {
        let image = self.surface.take().map(OutputSurface::finish);
        self.guard = None;
        self.state = WalkState::Done;

        let image = image.ok_or(SnapshotError::AlreadyFinished)?;
        info!(
            target: targets::WALKER,
            width = image.width(),
            height = image.height(),
            pages = self.completed,
            elapsed = ?now.saturating_duration_since(self.started_at),
            "paginated capture complete"
        );
        Ok(image)
    }

    fn fail(&mut self, err: SnapshotError) -> SnapshotResult<ImageBuffer> {
        self.surface = None;
        self.guard = None;
        self.state = WalkState::Done;
        Err(err)
    }
}

impl<C: ScrollContainer + ?Sized> std::fmt::Debug for PageWalker<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageWalker")
            .field("plan", &self.plan)
            .field("delta", &self.delta)
            .field("phase", &self.phase())
            .field("completed", &self.completed)
            .finish()
    }
}

/// A walk with its container type erased, so walks over different
/// containers can share one scheduler.
pub trait Walk {
    /// See [`PageWalker::poll`].
    fn poll(&mut self, now: Instant) -> WalkPoll;

    /// See [`PageWalker::cancel`].
    fn cancel(&mut self) -> Option<SnapshotError>;

    /// See [`PageWalker::progress`].
    fn progress(&self) -> (usize, usize);
}

impl<C: ScrollContainer + ?Sized> Walk for PageWalker<'_, C> {
    fn poll(&mut self, now: Instant) -> WalkPoll {
        PageWalker::poll(self, now)
    }

    fn cancel(&mut self) -> Option<SnapshotError> {
        PageWalker::cancel(self)
    }

    fn progress(&self) -> (usize, usize) {
        PageWalker::progress(self)
    }
}
