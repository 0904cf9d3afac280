use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Counter incremented once per period on a background task
///
/// The first increment happens one full period after `spawn`. `stop` cancels
/// and joins the task, so no increment can land afterwards.
pub struct Ticker {
    count: Arc<AtomicU64>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(period: Duration) -> Self {
        let count = Arc::new(AtomicU64::new(0));
        let cancel = CancellationToken::new();

        let task_count = Arc::clone(&count);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        task_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        });

        Self {
            count,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Cancel without waiting; the count stops moving once the task sees it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel the task, wait for it, and return the final count
    pub async fn stop(&mut self) -> u64 {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Ticker task panicked: {}", e);
            }
        }
        self.count()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
