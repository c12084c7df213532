//! Exponential backoff with jitter, capped between a lower and upper bound.
//!
//! Shaped like the prior codebase's `extractor::retry::RetryPolicy`, but
//! exposed as the `wait()`/`reset()` pair the ingestion loop needs: the loop
//! owns one `Backoff` per analyzer and calls `wait()` on every retried
//! height, `reset()` on every successful one.

use crate::errors::IngestError;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct Backoff {
    lower: Duration,
    upper: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(lower: Duration, upper: Duration) -> Result<Self, IngestError> {
        if lower.is_zero() || upper.is_zero() {
            return Err(IngestError::Config(
                "backoff bounds must be positive".to_string(),
            ));
        }
        if lower > upper {
            return Err(IngestError::Config(
                "backoff lower bound must not exceed upper bound".to_string(),
            ));
        }
        Ok(Self {
            lower,
            upper,
            current: lower,
        })
    }

    /// Matches the spec's defaults: 100ms lower bound, 6s upper cap (the
    /// expected block period of the upstream chain).
    pub fn default_for_chain() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(6))
            .expect("default bounds are valid")
    }

    /// Sleeps for the current interval (plus jitter), then doubles it, capped
    /// at the upper bound.
    pub async fn wait(&mut self) {
        let jittered = jitter(self.current);
        tracing::debug!(target: "chain_ingest::backoff", wait_ms = jittered.as_millis() as u64, "backing off");
        sleep(jittered).await;

        let doubled = self.current.saturating_mul(2);
        self.current = doubled.min(self.upper);
    }

    /// Returns the interval to the lower bound after a success.
    pub fn reset(&mut self) {
        self.current = self.lower;
    }

    pub fn current_interval(&self) -> Duration {
        self.current
    }
}

/// Adds up to +/-25% jitter around `base`, never going below zero.
fn jitter(base: Duration) -> Duration {
    let base_ms = base.as_millis() as i64;
    let spread = base_ms / 4;
    if spread == 0 {
        return base;
    }
    let delta = rand::thread_rng().gen_range(-spread..=spread);
    let jittered_ms = (base_ms + delta).max(0) as u64;
    Duration::from_millis(jittered_ms)
}
