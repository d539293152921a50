//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::{AibitatError, Result};

/// Wrap a future with a timeout. Expiry surfaces as [`AibitatError::Timeout`],
/// which is classified as a server failure.
pub async fn with_timeout<T>(duration: Duration, future: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(AibitatError::Timeout(duration.as_millis() as u64)),
    }
}
