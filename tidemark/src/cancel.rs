//! Cooperative cancellation for migration runs.
//!
//! A [`CancellationToken`] is shared between the caller and every target of a
//! run. Drivers can register hooks that interrupt in-flight statements; the
//! executor polls the token around each transaction and rolls back before
//! returning when it fires.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A callback run once when the token is cancelled.
pub type CancelHook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    hooks: Mutex<Vec<CancelHook>>,
}

/// A cloneable cancellation signal.
///
/// # Examples
///
/// ```
/// use tidemark::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
///
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and runs every registered hook.
    ///
    /// Cancelling twice is a no-op.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = std::mem::take(
            &mut *self
                .inner
                .hooks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for hook in hooks {
            hook();
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Registers a hook to run on cancellation.
    ///
    /// If the token is already cancelled the hook runs immediately.
    pub fn on_cancel(&self, hook: CancelHook) {
        let mut hooks = self
            .inner
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            drop(hooks);
            hook();
        } else {
            hooks.push(hook);
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> CancelHook {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_hooks_run_once_on_cancel() {
        let token = CancellationToken::new();
        let counter = Arc::new(AtomicUsize::new(0));
        token.on_cancel(counting_hook(&counter));
        token.on_cancel(counting_hook(&counter));

        token.cancel();
        token.cancel();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hook_registered_after_cancel_runs_immediately() {
        let token = CancellationToken::new();
        token.cancel();

        let counter = Arc::new(AtomicUsize::new(0));
        token.on_cancel(counting_hook(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clones_share_state_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();

        std::thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(token.is_cancelled());
    }
}
