use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between dispatched requests.
///
/// Callers are serialized on the lock and each waits out its own delay, so no two
/// dispatches are ever closer than `min_interval`. There is no FIFO guarantee.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Wait for the next dispatch slot and claim it. Returns the dispatch time.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        now
    }
}
