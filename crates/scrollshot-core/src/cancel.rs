//! Cooperative cancellation for long-running captures.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

type CancelCallback = Box<dyn FnOnce() + Send + 'static>;

new_key_type! {
    struct CallbackId;
}

/// A cancellation token for cooperative capture cancellation.
///
/// A paginated capture checks its token between page steps and stops at the
/// next check once the token is cancelled. Clones share the same state, so a
/// token can be handed to a capture and cancelled from anywhere else.
///
/// # Example
///
/// ```
/// use scrollshot_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

struct CancellationState {
    cancelled: AtomicBool,
    callbacks: Mutex<SlotMap<CallbackId, CancelCallback>>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                callbacks: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// Registered callbacks run once, on the calling thread, the first time
    /// the token is cancelled.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        tracing::debug!(
            target: targets::CANCEL,
            callbacks = callbacks.len(),
            "cancellation requested"
        );
        for (_, callback) in callbacks {
            callback();
        }
    }

    /// Run `callback` when the token is cancelled.
    ///
    /// If the token is already cancelled the callback runs immediately.
    /// Dropping the returned registration removes a callback that has not
    /// run yet.
    pub fn on_cancel<F>(&self, callback: F) -> CancelRegistration
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut callbacks = self.inner.callbacks.lock();
            if !self.is_cancelled() {
                let id = callbacks.insert(Box::new(callback));
                return CancelRegistration {
                    state: Arc::clone(&self.inner),
                    id: Some(id),
                };
            }
        }
        callback();
        CancelRegistration {
            state: Arc::clone(&self.inner),
            id: None,
        }
    }

    /// Number of callbacks waiting for cancellation.
    pub fn pending_callbacks(&self) -> usize {
        self.inner.callbacks.lock().len()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Keeps an [`on_cancel`](CancellationToken::on_cancel) callback registered.
///
/// The callback is removed when this is dropped.
#[must_use = "dropping the registration removes the callback"]
pub struct CancelRegistration {
    state: Arc<CancellationState>,
    id: Option<CallbackId>,
}

impl Drop for CancelRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.state.callbacks.lock().remove(id);
        }
    }
}

impl fmt::Debug for CancelRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelRegistration")
            .field("registered", &self.id.is_some())
            .finish()
    }
}
