//! Settle timers for paginated captures.
//!
//! A [`TimerManager`] is a deadline queue of one-shot timers. It never sleeps
//! and never reads the clock on its own: the caller passes `now` to every
//! query, which keeps capture stepping deterministic under test and lets the
//! same queue be driven by a real event loop or by synthetic instants.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer fires.
    fire_time: Instant,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages pending one-shot timers.
#[derive(Debug)]
pub struct TimerManager {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> TimerId {
        self.schedule_at(now + duration)
    }

    /// Schedule a one-shot timer at a specific instant.
    ///
    /// An instant in the past fires on the next call to
    /// [`process_expired`](Self::process_expired).
    pub fn schedule_at(&mut self, fire_time: Instant) -> TimerId {
        let id = self.timers.insert(TimerData { fire_time });
        self.queue.push(TimerQueueEntry { id, fire_time });
        tracing::trace!(target: targets::TIMER, ?id, "timer scheduled");
        id
    }

    /// Stop and remove a timer.
    ///
    /// Returns `Ok(())` if the timer was pending, or an error if it already
    /// fired or was never issued by this manager.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        match self.timers.remove(id) {
            Some(_) => Ok(()),
            None => Err(TimerError::InvalidTimerId.into()),
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// When a pending timer fires.
    pub fn fire_time(&self, id: TimerId) -> Option<Instant> {
        self.timers.get(id).map(|timer| timer.fire_time)
    }

    /// The earliest pending fire time, if any.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.prune_stopped();
        self.queue.peek().map(|entry| entry.fire_time)
    }

    /// Get the duration from `now` until the next timer fires.
    ///
    /// Returns `None` if there are no pending timers, and `Duration::ZERO`
    /// when a timer is already due.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|fire_time| fire_time.saturating_duration_since(now))
    }

    /// Fire every timer due at or before `now`.
    ///
    /// Returns the fired timer IDs ordered by fire time. Fired timers are
    /// removed; they never fire twice.
    #[tracing::instrument(skip(self), target = "scrollshot_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Stopped timers leave stale queue entries behind.
            if self.timers.remove(entry.id).is_none() {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Drop stale entries of stopped timers from the front of the queue.
    fn prune_stopped(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.fire_time(entry.id) == Some(entry.fire_time) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(start, ms(600));
        let early = timers.start_one_shot(start, ms(300));

        assert_eq!(timers.active_count(), 2);
        assert_eq!(timers.process_expired(start + ms(700)), vec![early, late]);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_not_due_yet() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(300));

        assert!(timers.process_expired(start + ms(299)).is_empty());
        assert!(timers.is_active(id));
        assert_eq!(timers.time_until_next(start + ms(100)), Some(ms(200)));
    }

    #[test]
    fn test_stop_removes_timer() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(10));

        timers.stop(id).unwrap();
        assert!(!timers.is_active(id));
        assert!(timers.process_expired(start + ms(20)).is_empty());
        assert_eq!(timers.next_deadline(), None);

        let err = timers.stop(id).unwrap_err();
        assert_eq!(err, CoreError::Timer(TimerError::InvalidTimerId));
    }

    #[test]
    fn test_stopped_front_timer_is_skipped() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let early = timers.start_one_shot(start, ms(10));
        let late = timers.start_one_shot(start, ms(40));
        assert_eq!(timers.fire_time(early), Some(start + ms(10)));

        timers.stop(early).unwrap();
        assert_eq!(timers.fire_time(early), None);
        assert_eq!(timers.next_deadline(), Some(start + ms(40)));
        assert_eq!(timers.process_expired(start + ms(40)), vec![late]);
    }

    #[test]
    fn test_module_logs_under_timer_target() {
        assert_eq!(targets::TIMER, module_path!().trim_end_matches("::tests"));
    }

    #[test]
    fn test_overdue_timer_reports_zero_wait() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        timers.schedule_at(start);

        assert_eq!(timers.time_until_next(start + ms(50)), Some(Duration::ZERO));
    }

    #[test]
    fn test_empty_manager() {
        let mut timers = TimerManager::default();
        assert_eq!(timers.time_until_next(Instant::now()), None);
        assert_eq!(timers.active_count(), 0);
    }
}
