//! Agent participants.

use std::sync::Arc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::provider::Provider;

const DEFAULT_AGENT_ROLE: &str = "You are a helpful AI assistant.";
const DEFAULT_ASSISTANT_ROLE: &str = "You are a human operator's assistant. \
Review the conversation and reply with short, direct feedback.";

/// Whether the conversation pauses for external feedback when a participant
/// is about to speak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum InterruptPolicy {
    Never,
    Always,
}

/// Participant kind; drives the default role and interrupt policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantKind {
    /// Model-driven participant. Never interrupts by default.
    #[default]
    Agent,
    /// Stands in for a human operator. Interrupts by default so the operator
    /// can answer in its place.
    Assistant,
}

impl ParticipantKind {
    pub fn default_role(self) -> &'static str {
        match self {
            Self::Agent => DEFAULT_AGENT_ROLE,
            Self::Assistant => DEFAULT_ASSISTANT_ROLE,
        }
    }

    pub fn default_interrupt(self) -> InterruptPolicy {
        match self {
            Self::Agent => InterruptPolicy::Never,
            Self::Assistant => InterruptPolicy::Always,
        }
    }
}

/// Registration settings for an agent.
///
/// ```
/// use aibitat::participants::{AgentConfig, InterruptPolicy};
///
/// let config = AgentConfig::builder()
///     .role("You are a terse reviewer.")
///     .interrupt(InterruptPolicy::Always)
///     .functions(vec!["search".to_string()])
///     .build();
/// assert_eq!(config.system_role(), "You are a terse reviewer.");
/// ```
#[derive(Clone, Default, Builder)]
pub struct AgentConfig {
    #[builder(default)]
    pub kind: ParticipantKind,
    #[builder(into)]
    pub role: Option<String>,
    pub interrupt: Option<InterruptPolicy>,
    /// Names of registered functions this agent may call.
    #[builder(default)]
    pub functions: Vec<String>,
    pub provider: Option<Arc<dyn Provider>>,
}

impl AgentConfig {
    /// System prompt for this agent, falling back to the kind default.
    pub fn system_role(&self) -> &str {
        self.role.as_deref().unwrap_or(self.kind.default_role())
    }

    /// Resolve the effective interrupt policy: explicit setting, then the
    /// engine-wide default, then the kind default.
    pub fn interrupt_policy(&self, engine_default: Option<InterruptPolicy>) -> InterruptPolicy {
        self.interrupt
            .or(engine_default)
            .unwrap_or(self.kind.default_interrupt())
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("kind", &self.kind)
            .field("role", &self.role)
            .field("interrupt", &self.interrupt)
            .field("functions", &self.functions)
            .field("provider", &self.provider.as_ref().map(|p| p.model_id().to_string()))
            .finish()
    }
}
