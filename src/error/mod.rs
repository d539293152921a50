//! Error types for Aibitat.

pub mod unified;

pub use unified::{ApiErrorKind, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all Aibitat operations.
#[derive(Error, Debug)]
pub enum AibitatError {
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    RateLimit(String),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Function call limit of {limit} reached (last call: {name})")]
    FunctionCallLimit { name: String, limit: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Maximum rounds reached between {from} and {to}")]
    MaximumRounds { from: String, to: String },

    #[error("Function {name} failed: {message}")]
    Function { name: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AibitatError {
    /// Create a function failure.
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classify a provider failure. `None` means the error is not part of the
    /// API family and must not be swallowed by the engine.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Authorization(_) => Some(ApiErrorKind::Authorization),
            Self::RateLimit(_) => Some(ApiErrorKind::RateLimit),
            Self::Server(_) | Self::Timeout(_) | Self::Network(_) => Some(ApiErrorKind::Server),
            Self::Unknown(_) | Self::Cancelled | Self::FunctionCallLimit { .. } => {
                Some(ApiErrorKind::Unknown)
            }
            _ => None,
        }
    }

    /// Whether this error belongs to the classified provider family.
    pub fn is_api_error(&self) -> bool {
        self.api_kind().is_some()
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        self.api_kind().is_some_and(ApiErrorKind::is_retryable)
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::Configuration(_) | Self::UnknownParticipant(_) => {
                RecoverySuggestion::CheckConfiguration
            }
            Self::Function { .. } | Self::FunctionCallLimit { .. } => {
                RecoverySuggestion::CheckFunctionImplementation
            }
            _ => match self.api_kind() {
                Some(ApiErrorKind::Authorization) => RecoverySuggestion::CheckCredentials,
                Some(ApiErrorKind::RateLimit) | Some(ApiErrorKind::Server) => {
                    RecoverySuggestion::RetryWithBackoff
                }
                _ => RecoverySuggestion::ContactSupport,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AibitatError>;
