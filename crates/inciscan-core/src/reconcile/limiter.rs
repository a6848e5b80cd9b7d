use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-interval gate in front of the Reference Service.
///
/// Politeness toward the live service is a required behavior, not an
/// optimization: every query must wait out the configured interval since
/// the previous one, no matter how reconciliation is parallelized. Share
/// one gate (behind an `Arc`) across everything that talks to the same
/// service.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateGate {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::const_new(None),
        }
    }

    /// Sleep out the remainder of the interval, then stamp. The lock is
    /// held across the sleep so concurrent callers queue up and each gets
    /// its own full interval.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_passes_immediately() {
        let gate = RateGate::new(Duration::from_secs(1));
        let start = Instant::now();

        gate.wait().await;

        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successive_calls_are_spaced() {
        let gate = RateGate::new(Duration::from_millis(100));
        let start = Instant::now();

        gate.wait().await;
        gate.wait().await;
        gate.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_interval_does_not_sleep() {
        let gate = RateGate::new(Duration::from_millis(50));

        gate.wait().await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let before = Instant::now();
        gate.wait().await;
        assert!(before.elapsed() < Duration::from_millis(10));
    }
}
