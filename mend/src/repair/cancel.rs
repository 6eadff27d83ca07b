//! Cooperative cancellation for in-flight repair runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;

/// Signal for cancelling a repair run.
///
/// Clones share state: cancelling any clone cancels them all. A cancel
/// delivered while a generator call is in flight aborts that call and the
/// whole run; one delivered between attempts stops the next attempt from
/// starting.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    reason: OnceLock<String>,
    notify: Notify,
}

impl CancelSignal {
    /// Reason reported when none was given.
    pub const DEFAULT_REASON: &'static str = "cancelled by caller";

    /// Creates a signal that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the run.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Cancels with a reason message. The first reason wins.
    pub fn cancel_with_reason(&self, reason: impl Into<String>) {
        let _ = self.inner.reason.set(reason.into());
        self.cancel();
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// The cancellation reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.inner
            .reason
            .get()
            .map_or(Self::DEFAULT_REASON, String::as_str)
    }

    /// Completes once the signal fires. Returns immediately if it already has.
    pub async fn cancelled(&self) {
        let mut notified = std::pin::pin!(self.inner.notify.notified());
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn clones_share_state() {
        let signal = CancelSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());

        signal.cancel_with_reason("ctrl-c");
        signal.cancel_with_reason("ignored");
        assert!(clone.is_cancelled());
        assert_eq!(clone.reason(), "ctrl-c");
    }

    #[test]
    fn default_reason() {
        let signal = CancelSignal::new();
        signal.cancel();
        assert_eq!(signal.reason(), CancelSignal::DEFAULT_REASON);
    }

    #[tokio::test]
    async fn cancelled_returns_if_already_fired() {
        let signal = CancelSignal::new();
        signal.cancel();
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("should resolve immediately");
    }

    #[tokio::test]
    async fn cancelled_wakes_waiter() {
        let signal = CancelSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        tokio::time::timeout(Duration::from_secs(2), signal.cancelled())
            .await
            .expect("waiter should be woken");
    }
}
