//! Channels: named groups that relay turns through speaker selection.

use std::sync::Arc;

use bon::Builder;

use crate::provider::Provider;

/// Rounds a channel allows when none are configured.
pub const DEFAULT_CHANNEL_MAX_ROUNDS: usize = 10;

#[derive(Clone, Builder)]
pub struct ChannelConfig {
    /// System prompt used when asking the provider to pick the next speaker.
    #[builder(into, default)]
    pub role: String,
    #[builder(default = DEFAULT_CHANNEL_MAX_ROUNDS)]
    pub max_rounds: usize,
    pub provider: Option<Arc<dyn Provider>>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("role", &self.role)
            .field("max_rounds", &self.max_rounds)
            .field("provider", &self.provider.as_ref().map(|p| p.model_id().to_string()))
            .finish()
    }
}

/// A registered channel.
#[derive(Debug, Clone)]
pub struct Channel {
    pub members: Vec<String>,
    pub config: ChannelConfig,
}

impl Channel {
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    /// Fewer than three members: a direct exchange would serve as well.
    pub fn is_underpopulated(&self) -> bool {
        self.members.len() < 3
    }
}
