//! Time source used for rate-limit waits and retry jitter.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

/// Wall clock plus sleeping, injectable so retry timing is deterministic in tests.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch, with sub-second precision.
    fn now(&self) -> f64;

    async fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
