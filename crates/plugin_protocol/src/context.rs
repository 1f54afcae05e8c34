//! Per-build context handed from the host to a plugin.
//!
//! The host owns a [`CancelHandle`]; the plugin observes the matching [`BuildContext`].
//! Plugins that launch child processes are expected to stop them once the context is cancelled.

use tokio::sync::watch;

/// Context for a single build invocation.
///
/// Cloning is cheap and every clone observes the same cancellation signal.
#[derive(Debug, Clone)]
pub struct BuildContext {
    cancelled: watch::Receiver<bool>,
}

/// Host-side handle used to cancel a running build.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl BuildContext {
    /// Create a context together with the handle that cancels it.
    #[must_use]
    pub fn new() -> (Self, CancelHandle) {
        let (sender, cancelled) = watch::channel(false);
        (Self { cancelled }, CancelHandle { sender })
    }

    /// A context that is never cancelled.
    #[must_use]
    pub fn detached() -> Self {
        Self::new().0
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once cancellation has been requested.
    ///
    /// If the [`CancelHandle`] is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut receiver = self.cancelled.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl CancelHandle {
    /// Request cancellation of every context linked to this handle.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiters() {
        let (ctx, handle) = BuildContext::new();
        assert!(!ctx.is_cancelled());

        let waiter = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.cancelled().await }
        });

        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn detached_context_never_cancels() {
        let ctx = BuildContext::detached();
        assert!(!ctx.is_cancelled());
        let outcome = tokio::time::timeout(Duration::from_millis(50), ctx.cancelled()).await;
        assert!(outcome.is_err());
    }
}
