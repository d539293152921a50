//! Error recovery: replay failed turns with exponential backoff and jitter.
//!
//! The engine never retries on its own. A conversation that halted on a
//! retryable `error` record (rate limit, server failure) can be handed to
//! [`RetryPolicy::recover`], which waits and calls [`Aibitat::retry`] until
//! the conversation moves past the failure.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::engine::Aibitat;
use crate::error::Result;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of replays.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(60),
            max_backoff: Duration::from_secs(300),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Replay the failed turn while the ledger tail is a retryable error.
    ///
    /// Returns `true` once the conversation is no longer paused on an error,
    /// `false` if it still is (non-retryable kind or attempts exhausted).
    /// Errors that escape [`Aibitat::retry`] propagate.
    pub async fn recover(&self, engine: &mut Aibitat) -> Result<bool> {
        let mut backoff = self.initial_backoff;

        for attempt in 0..self.max_attempts {
            let Some(kind) = engine.last_error_kind() else {
                return Ok(true);
            };
            if !kind.is_retryable() {
                debug!(%kind, "error is not retryable, leaving conversation paused");
                return Ok(false);
            }

            let jitter = rand::rng().random_range(0.75..1.25);
            let sleep_for = Duration::from_secs_f64(backoff.as_secs_f64() * jitter);
            warn!(
                attempt = attempt + 1,
                max_attempts = self.max_attempts,
                %kind,
                wait_ms = sleep_for.as_millis() as u64,
                "retrying failed turn"
            );
            tokio::time::sleep(sleep_for).await;

            engine.retry().await?;

            backoff = Duration::from_secs_f64(
                (backoff.as_secs_f64() * self.multiplier).min(self.max_backoff.as_secs_f64()),
            );
        }

        Ok(engine.last_error_kind().is_none())
    }
}
