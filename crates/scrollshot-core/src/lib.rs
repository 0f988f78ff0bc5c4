//! Core systems for Scrollshot.
//!
//! This crate provides the small runtime pieces the capture engine is built on:
//!
//! - **Timers**: a deadline queue of one-shot settle timers driven by an
//!   external tick, so a capture can be stepped without sleeping
//! - **Cancellation**: a cloneable token checked between capture steps
//! - **Logging**: `tracing` target and span names for log filtering
//!
//! # Timer Example
//!
//! ```
//! use scrollshot_core::TimerManager;
//! use std::time::{Duration, Instant};
//!
//! let mut timers = TimerManager::new();
//! let start = Instant::now();
//! let id = timers.schedule_at(start + Duration::from_millis(300));
//!
//! // Nothing has expired yet.
//! assert!(timers.process_expired(start).is_empty());
//!
//! // Once the deadline passes the timer fires exactly once.
//! let fired = timers.process_expired(start + Duration::from_millis(300));
//! assert_eq!(fired, vec![id]);
//! assert!(!timers.is_active(id));
//! ```

mod cancel;
mod error;
pub mod logging;
mod timer;

pub use cancel::{CancelRegistration, CancellationToken};
pub use error::{CoreError, Result, TimerError};
pub use timer::{TimerId, TimerManager};
