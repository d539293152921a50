//! Ledger records and routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ApiErrorKind;

/// Sentinel reply that ends the current conversation.
pub const TERMINATE: &str = "TERMINATE";

/// Sentinel reply that pauses the conversation for external feedback.
pub const INTERRUPT: &str = "INTERRUPT";

/// Final state of a ledger record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatState {
    Success,
    Error,
    Interrupt,
}

/// The two parties exchanging a turn. Directional for dispatch, symmetric
/// for history lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Route {
    pub from: String,
    pub to: String,
}

impl Route {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The same pair with direction flipped.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    /// Whether a record travels between the two parties, in either direction.
    pub fn connects(&self, from: &str, to: &str) -> bool {
        (self.from == from && self.to == to) || (self.from == to && self.to == from)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A message used to start (or resume with feedback) a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartMessage {
    pub from: String,
    pub to: String,
    pub content: String,
}

impl StartMessage {
    pub fn new(from: impl Into<String>, to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            content: content.into(),
        }
    }

    pub fn route(&self) -> Route {
        Route::new(self.from.clone(), self.to.clone())
    }
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRecord {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub state: ChatState,
    /// Failure class of an `error` record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ApiErrorKind>,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    pub fn success(route: &Route, content: impl Into<String>) -> Self {
        Self::new(route, Some(content.into()), ChatState::Success)
    }

    pub fn error(route: &Route, content: impl Into<String>, kind: ApiErrorKind) -> Self {
        Self {
            error_kind: Some(kind),
            ..Self::new(route, Some(content.into()), ChatState::Error)
        }
    }

    /// A pending turn awaiting feedback; it has no content.
    pub fn interrupt(route: &Route) -> Self {
        Self::new(route, None, ChatState::Interrupt)
    }

    fn new(route: &Route, content: Option<String>, state: ChatState) -> Self {
        Self {
            from: route.from.clone(),
            to: route.to.clone(),
            content,
            state,
            error_kind: None,
            created_at: Utc::now(),
        }
    }

    pub fn route(&self) -> Route {
        Route::new(self.from.clone(), self.to.clone())
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.state == ChatState::Success
    }
}
