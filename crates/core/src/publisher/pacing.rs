//! Delay between planning LLM calls.
//!
//! Shared API rate limits are generous enough for content generation, but
//! back-to-back planning calls for large courses can trip them. A fixed
//! pause before each planning call keeps jobs inside the budget.

use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone)]
pub struct StepPacer {
    delay: Duration,
}

impl StepPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A pacer that never sleeps, for tests and local models.
    pub fn disabled() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep the configured delay. No-op when the delay is zero.
    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!(delay_secs = self.delay.as_secs_f64(), "pacing before planning call");
        tokio::time::sleep(self.delay).await;
    }
}
