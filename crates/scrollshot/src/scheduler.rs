//! Single-threaded event loop for paginated captures.
//!
//! The scheduler owns a [`TimerManager`] and any number of running walks, one
//! per container. Each walk has exactly one pending timer; when it fires the
//! walk is polled and either re-armed at the instant it asks for or finished,
//! at which point its completion runs.
//!
//! The scheduler does not own a clock. Embed it in an existing event loop by
//! sleeping for [`time_until_next`](SnapshotScheduler::time_until_next) and
//! then calling [`process_expired`](SnapshotScheduler::process_expired), or
//! let [`run_until_idle`](SnapshotScheduler::run_until_idle) do both.

use std::time::{Duration, Instant};

use scrollshot_core::logging::{span_names, targets};
use scrollshot_core::{TimerId, TimerManager};
use scrollshot_render::ImageBuffer;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use tracing::{debug, trace};

use crate::error::SnapshotResult;
use crate::walker::{Walk, WalkPoll};

new_key_type! {
    /// Identifies a capture running on a [`SnapshotScheduler`].
    pub struct CaptureId;
}

type Completion<'a> = Box<dyn FnOnce(SnapshotResult<ImageBuffer>) + 'a>;

struct Job<'a> {
    walk: Box<dyn Walk + 'a>,
    completion: Completion<'a>,
    timer: TimerId,
}

/// Runs paginated captures off one timer queue.
///
/// Walks borrow their containers for `'a`, so the containers become
/// available again once the scheduler is dropped.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use scrollshot::{ScrollArea, SnapshotScheduler, Snapshotter};
/// use scrollshot_render::{Color, ImageBuffer, Rect};
///
/// let mut area = ScrollArea::new(
///     Rect::new(0.0, 0.0, 50.0, 100.0),
///     ImageBuffer::from_color(50, 250, Color::GREEN),
/// );
/// let output = RefCell::new(None);
///
/// {
///     let mut scheduler = SnapshotScheduler::new();
///     Snapshotter::new().capture_full_content_async(&mut scheduler, &mut area, |result| {
///         *output.borrow_mut() = Some(result);
///     });
///
///     // Step through virtual time instead of sleeping.
///     while let Some(at) = scheduler.next_wake() {
///         scheduler.process_expired(at);
///     }
/// }
///
/// let image = output.into_inner().unwrap().unwrap();
/// assert_eq!(image.dimensions(), (50, 250));
/// assert_eq!(area.render_count(), 3);
/// ```
pub struct SnapshotScheduler<'a> {
    timers: TimerManager,
    jobs: SlotMap<CaptureId, Job<'a>>,
    by_timer: SecondaryMap<TimerId, CaptureId>,
}

impl<'a> SnapshotScheduler<'a> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            timers: TimerManager::new(),
            jobs: SlotMap::with_key(),
            by_timer: SecondaryMap::new(),
        }
    }

    /// Add a started walk. Its first poll is due at `now`.
    pub fn submit<W, F>(&mut self, walk: W, completion: F, now: Instant) -> CaptureId
    where
        W: Walk + 'a,
        F: FnOnce(SnapshotResult<ImageBuffer>) + 'a,
    {
        let timer = self.timers.schedule_at(now);
        let (_, total) = walk.progress();
        let id = self.jobs.insert(Job {
            walk: Box::new(walk),
            completion: Box::new(completion),
            timer,
        });
        self.by_timer.insert(timer, id);
        debug!(target: targets::SCHEDULER, ?id, steps = total, "capture submitted");
        id
    }

    /// Instant the next walk wants to be polled at.
    pub fn next_wake(&mut self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Time from `now` until the next walk is due.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// Poll every walk whose timer is due at `now`.
    ///
    /// Finished walks have already restored their viewport when their
    /// completion runs. Returns the number of captures that finished.
    pub fn process_expired(&mut self, now: Instant) -> usize {
        let _tick = tracing::trace_span!(target: targets::SCHEDULER, span_names::TICK, ?now).entered();
        let mut finished = 0;

        for timer in self.timers.process_expired(now) {
            let Some(id) = self.by_timer.remove(timer) else {
                continue;
            };
            let Some(job) = self.jobs.get_mut(id) else {
                continue;
            };

            match job.walk.poll(now) {
                WalkPoll::Pending { wake_at } => {
                    let next = self.timers.schedule_at(wake_at);
                    job.timer = next;
                    self.by_timer.insert(next, id);
                    trace!(target: targets::SCHEDULER, ?id, ?wake_at, "capture re-armed");
                }
                WalkPoll::Ready(result) => {
                    if let Some(job) = self.jobs.remove(id) {
                        debug!(
                            target: targets::SCHEDULER,
                            ?id,
                            ok = result.is_ok(),
                            "capture finished"
                        );
                        // Drop the walk before completing so the viewport is
                        // already restored.
                        drop(job.walk);
                        (job.completion)(result);
                        finished += 1;
                    }
                }
            }
        }

        finished
    }

    /// Cancel a running capture.
    ///
    /// The viewport is restored and the completion runs with
    /// [`SnapshotError::Cancelled`](crate::SnapshotError::Cancelled) before
    /// this returns. Returns `false` if the capture is not running.
    pub fn cancel(&mut self, id: CaptureId) -> bool {
        let Some(mut job) = self.jobs.remove(id) else {
            return false;
        };
        self.by_timer.remove(job.timer);
        if let Err(err) = self.timers.stop(job.timer) {
            trace!(target: targets::SCHEDULER, ?id, %err, "timer already gone");
        }

        let outcome = job.walk.cancel();
        drop(job.walk);
        if let Some(err) = outcome {
            (job.completion)(Err(err));
        }
        debug!(target: targets::SCHEDULER, ?id, "capture cancelled");
        true
    }

    /// Pages rendered and total steps of a running capture.
    pub fn progress(&self, id: CaptureId) -> Option<(usize, usize)> {
        self.jobs.get(id).map(|job| job.walk.progress())
    }

    /// Number of running captures.
    pub fn active_captures(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no capture is running.
    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Block the current thread, sleeping between timers, until every
    /// capture has finished.
    pub fn run_until_idle(&mut self) {
        while let Some(wait) = self.time_until_next(Instant::now()) {
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
            self.process_expired(Instant::now());
        }
    }
}

impl Default for SnapshotScheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnapshotScheduler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotScheduler")
            .field("active_captures", &self.jobs.len())
            .field("pending_timers", &self.timers.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureConfig;
    use crate::container::ScrollContainer;
    use crate::error::SnapshotError;
    use crate::scroll_area::ScrollArea;
    use crate::snapshot::Snapshotter;
    use scrollshot_render::{Color, Point, Rect};
    use std::cell::RefCell;

    fn area(height: u32) -> ScrollArea {
        ScrollArea::new(
            Rect::new(0.0, 0.0, 30.0, 100.0),
            ImageBuffer::from_color(30, height, Color::BLUE),
        )
    }

    #[test]
    fn test_runs_two_captures_interleaved() {
        let mut first = area(250);
        let mut second = area(520);
        let results = RefCell::new(Vec::new());

        {
            let snapshotter = Snapshotter::new();
            let mut scheduler = SnapshotScheduler::new();
            snapshotter.capture_full_content_async(&mut scheduler, &mut first, |result| {
                results.borrow_mut().push(result.map(|image| image.height()));
            });
            snapshotter.capture_full_content_async(&mut scheduler, &mut second, |result| {
                results.borrow_mut().push(result.map(|image| image.height()));
            });
            assert_eq!(scheduler.active_captures(), 2);

            let mut finished = 0;
            while let Some(at) = scheduler.next_wake() {
                finished += scheduler.process_expired(at);
            }
            assert_eq!(finished, 2);
            assert!(scheduler.is_idle());
        }

        assert_eq!(results.into_inner(), vec![Ok(250), Ok(520)]);
        assert_eq!(first.render_count(), 3);
        assert_eq!(second.render_count(), 6);
    }

    #[test]
    fn test_cancel_completes_with_cancelled() {
        let mut target = area(1000);
        target.scroll_to(0.0, 33.0);
        let outcome = RefCell::new(None);

        {
            let mut scheduler = SnapshotScheduler::new();
            let id = Snapshotter::new()
                .capture_full_content_async(&mut scheduler, &mut target, |result| {
                    *outcome.borrow_mut() = Some(result);
                })
                .unwrap();

            let first = scheduler.next_wake().unwrap();
            scheduler.process_expired(first);
            scheduler.process_expired(first + CaptureConfig::default().settle_delay);
            assert_eq!(scheduler.progress(id), Some((1, 11)));

            assert!(scheduler.cancel(id));
            assert!(!scheduler.cancel(id));
            assert!(scheduler.next_wake().is_none());
        }

        assert!(matches!(
            outcome.into_inner(),
            Some(Err(SnapshotError::Cancelled {
                completed_pages: 1,
                total_pages: 11
            }))
        ));
        assert_eq!(target.content_offset(), Point::new(0.0, 33.0));
    }

    #[test]
    fn test_time_until_next() {
        let mut target = area(100);
        let mut scheduler = SnapshotScheduler::new();
        let now = Instant::now();
        let walker = Snapshotter::new().walk_full_content(&mut target, now).unwrap();
        scheduler.submit(walker, |_| {}, now);

        assert_eq!(scheduler.time_until_next(now), Some(Duration::ZERO));
        scheduler.process_expired(now);
        assert_eq!(
            scheduler.time_until_next(now),
            Some(CaptureConfig::default().settle_delay)
        );
    }
}
