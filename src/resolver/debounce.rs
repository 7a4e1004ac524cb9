use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A restartable, cancellable delay in front of a task.
///
/// Each [`schedule`](Debouncer::schedule) cancels the previous timer. Once a
/// timer has fired its task runs to completion; cancellation only stops
/// timers that have not fired yet. Dropping the debouncer cancels the pending
/// timer.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `task` after the delay unless rescheduled or cancelled first.
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.slot().replace(token.clone()) {
            previous.cancel();
        }
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => trace!("Debounce timer cancelled"),
                _ = tokio::time::sleep(delay) => {
                    // Fired; no longer pending.
                    token.cancel();
                    task.await
                }
            }
        });
    }

    pub fn cancel(&self) {
        if let Some(token) = self.slot().take() {
            token.cancel();
        }
    }

    /// Whether a timer is armed and has neither fired nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
