//! Cancellable dispatch timer.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Runs only the most recently scheduled job, once `delay` has passed
/// without a newer one replacing it.
///
/// Replacing or cancelling only stops the timer. A job that has already
/// started runs to completion on its own task.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
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

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(job);
        });
        if let Some(previous) = self.slot().replace(timer) {
            if !previous.is_finished() {
                debug!("Superseding pending dispatch");
            }
            previous.abort();
        }
    }

    /// Stop the pending timer. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(timer) = self.slot().take() {
            timer.abort();
        }
    }
}
