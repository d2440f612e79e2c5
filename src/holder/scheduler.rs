//! Single-shot debouncer driving the holder's flush-on-idle behavior. The
//! daemon calls `schedule()` after every mutating command; overlapping calls
//! coalesce into one timer, matching the teacher's preference for a single
//! cooperative timer over a thread pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::debug;

/// Re-armed by `schedule()`, consumed by the daemon's event loop via
/// `wait()`. Not a `tokio::time::Interval`: a debounce needs to *restart*
/// the wait on every call, which an interval does not do.
pub struct FlushScheduler {
    debounce: Duration,
    notify: Arc<Notify>,
    generation: std::sync::atomic::AtomicU64,
}

impl FlushScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, notify: Arc::new(Notify::new()), generation: std::sync::atomic::AtomicU64::new(0) }
    }

    /// Starts or resets the debounce timer. Returns immediately; the actual
    /// flush happens on the event loop the next time it polls `wait()`.
    pub fn schedule(&self) {
        self.generation.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Resolves once a debounce period has elapsed with no intervening
    /// `schedule()` call. Intended to be raced against the daemon's other
    /// suspension points in a `tokio::select!`.
    pub async fn wait(&self) {
        loop {
            self.notify.notified().await;
            let seen = self.generation.load(std::sync::atomic::Ordering::SeqCst);
            sleep(self.debounce).await;
            if self.generation.load(std::sync::atomic::Ordering::SeqCst) == seen {
                debug!("flush debounce elapsed");
                return;
            }
            // a later schedule() arrived during the sleep; loop and wait again
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_once_after_debounce_with_no_further_schedules() {
        let scheduler = FlushScheduler::new(Duration::from_millis(10));
        scheduler.schedule();
        scheduler.wait().await;
    }

    #[tokio::test]
    async fn overlapping_schedules_coalesce_into_one_wait() {
        let scheduler = FlushScheduler::new(Duration::from_millis(20));
        scheduler.schedule();
        tokio::time::sleep(Duration::from_millis(5)).await;
        scheduler.schedule();
        scheduler.wait().await;
    }
}
