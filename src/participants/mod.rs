//! Conversation participants: agents and channels.

pub mod agent;
pub mod channel;
pub mod registry;

pub use agent::{AgentConfig, InterruptPolicy, ParticipantKind};
pub use channel::{Channel, ChannelConfig, DEFAULT_CHANNEL_MAX_ROUNDS};
pub use registry::ParticipantRegistry;
