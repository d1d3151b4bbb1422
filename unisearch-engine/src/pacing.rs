//! Minimum-interval pacing for outbound calls.
//!
//! A [`Pacer`] spaces successive calls at least `1 / calls_per_second`
//! apart. Callers that arrive early are delayed, never rejected. Each
//! `Pacer` has its own `last_called` state, so two paced operations never
//! share a budget unless they share the same `Pacer`.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Result, SearchError};

/// Stateful pacing gate with an inspectable last-call timestamp.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_called: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a pacer allowing at most `calls_per_second` calls per second.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the rate is not a positive finite
    /// number, or is so small that its interval overflows a [`Duration`].
    pub fn new(calls_per_second: f64) -> Result<Self> {
        if !calls_per_second.is_finite() || calls_per_second <= 0.0 {
            return Err(SearchError::Config(format!(
                "calls_per_second must be a positive number, got {calls_per_second}"
            )));
        }
        let min_interval = Duration::try_from_secs_f64(1.0 / calls_per_second).map_err(|e| {
            SearchError::Config(format!(
                "calls_per_second {calls_per_second} gives an unrepresentable interval: {e}"
            ))
        })?;
        Ok(Self {
            min_interval,
            last_called: Mutex::new(None),
        })
    }

    /// Minimum spacing enforced between calls.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// When the most recent call was released, if any.
    pub async fn last_called(&self) -> Option<Instant> {
        *self.last_called.lock().await
    }

    /// Wait until the next call is allowed and mark it as released.
    ///
    /// Concurrent waiters are serialised by the internal lock, so each is
    /// released at least `min_interval` after the previous one.
    pub async fn wait(&self) {
        let mut last = self.last_called.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }

    /// Wait for the pacing slot, then run `op`.
    pub async fn call<F, Fut, T>(&self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.wait().await;
        op().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn rejects_invalid_rates() {
        for rate in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(Pacer::new(rate).is_err(), "rate {rate} should be rejected");
        }
    }

    #[test]
    fn rejects_rates_with_unrepresentable_interval() {
        let err = Pacer::new(1e-20).err().expect("should be rejected");
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("calls_per_second"));
    }

    #[test]
    fn interval_is_reciprocal_of_rate() {
        let pacer = Pacer::new(4.0).expect("valid rate");
        assert_eq!(pacer.min_interval(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_is_immediate() {
        let pacer = Pacer::new(1.0).expect("valid rate");
        assert!(pacer.last_called().await.is_none());

        let start = Instant::now();
        let value = pacer.call(|| async { 7 }).await;
        assert_eq!(value, 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(pacer.last_called().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn successive_calls_are_spaced() {
        let pacer = Pacer::new(2.0).expect("valid rate");
        let start = Instant::now();
        for _ in 0..3 {
            pacer.call(|| async {}).await;
        }
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_interval_has_passed() {
        let pacer = Pacer::new(1.0).expect("valid rate");
        pacer.wait().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_pacers_do_not_share_state() {
        let a = Pacer::new(1.0).expect("valid rate");
        let b = Pacer::new(1.0).expect("valid rate");
        a.wait().await;

        let start = Instant::now();
        b.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialised() {
        let pacer = Arc::new(Pacer::new(10.0).expect("valid rate"));
        let start = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pacer = Arc::clone(&pacer);
                tokio::spawn(async move { pacer.wait().await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("task");
        }
        // Four releases need three full intervals between them.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
