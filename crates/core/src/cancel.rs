//! Cooperative cancellation shared by emitter, renderer, and receiver loops.
//!
//! Generalizes the teacher's `Arc<AtomicBool> running` flag into a small
//! reusable type: a flag plus a condvar so blocked waiters wake promptly
//! instead of discovering cancellation only after their own timeout.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct Inner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

/// A cloneable, shareable cancellation flag.
///
/// `cancel()` is idempotent. `wait_timeout` parks the calling thread until
/// either the token is cancelled or the timeout elapses, whichever is
/// first — the mechanism behind interruptible pacing sleeps.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled and wake every thread parked in `wait_timeout`.
    pub fn cancel(&self) {
        *self.inner.cancelled.lock() = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep for up to `timeout`, returning early if cancelled meanwhile.
    ///
    /// Returns `true` if the token was cancelled (either already, or
    /// during the wait).
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if *cancelled {
            return true;
        }
        self.inner.condvar.wait_for(&mut cancelled, timeout);
        *cancelled
    }
}
