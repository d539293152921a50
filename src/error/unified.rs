//! Provider error classification and recovery.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Classified family of provider ("API") failures.
///
/// Only errors carrying one of these kinds are caught by the dispatch engine
/// and turned into `error` records; everything else propagates to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApiErrorKind {
    /// Invalid or forbidden credentials.
    Authorization,
    /// Provider-side throttling.
    RateLimit,
    /// Provider-side internal failure, transport failure or timeout.
    Server,
    /// Provider-classified but uncategorized failure.
    Unknown,
}

impl ApiErrorKind {
    /// Whether a failure of this kind may succeed when replayed after a backoff.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Server)
    }
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    CheckFunctionImplementation,
    ContactSupport,
}
