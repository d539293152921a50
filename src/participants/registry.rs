//! Agents and channels known to one engine instance.

use std::collections::HashMap;

use tracing::warn;

use super::agent::{AgentConfig, InterruptPolicy};
use super::channel::{Channel, ChannelConfig};
use crate::error::{AibitatError, Result};

#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    agents: HashMap<String, AgentConfig>,
    channels: HashMap<String, Channel>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) an agent.
    pub fn register_agent(&mut self, name: impl Into<String>, config: AgentConfig) -> Result<()> {
        let name = name.into();
        if self.channels.contains_key(&name) {
            return Err(AibitatError::Configuration(format!(
                "'{name}' is already registered as a channel"
            )));
        }
        self.agents.insert(name, config);
        Ok(())
    }

    /// Register (or re-register) a channel. Members must be non-empty; fewer
    /// than three members is allowed but flagged.
    pub fn register_channel(
        &mut self,
        name: impl Into<String>,
        members: Vec<String>,
        config: ChannelConfig,
    ) -> Result<()> {
        let name = name.into();
        if self.agents.contains_key(&name) {
            return Err(AibitatError::Configuration(format!(
                "'{name}' is already registered as an agent"
            )));
        }
        if members.is_empty() {
            return Err(AibitatError::Configuration(format!(
                "channel '{name}' needs at least one member"
            )));
        }
        if members.iter().any(|member| member == &name) {
            return Err(AibitatError::Configuration(format!(
                "channel '{name}' cannot contain itself"
            )));
        }
        let mut unique = Vec::with_capacity(members.len());
        for member in members {
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        let channel = Channel { members: unique, config };
        if channel.is_underpopulated() {
            warn!(
                channel = %name,
                members = channel.members.len(),
                "channel is underpopulated; direct communication would be more efficient"
            );
        }
        self.channels.insert(name, channel);
        Ok(())
    }

    pub fn agent(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.get(name)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn is_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn is_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.is_agent(name) || self.is_channel(name)
    }

    /// Fail unless `name` is a registered agent or channel.
    pub fn ensure_known(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(AibitatError::UnknownParticipant(name.to_string()))
        }
    }

    pub fn agent_or_err(&self, name: &str) -> Result<&AgentConfig> {
        self.agents
            .get(name)
            .ok_or_else(|| AibitatError::UnknownParticipant(name.to_string()))
    }

    pub fn channel_or_err(&self, name: &str) -> Result<&Channel> {
        self.channels
            .get(name)
            .ok_or_else(|| AibitatError::UnknownParticipant(name.to_string()))
    }

    /// Effective interrupt policy for any route endpoint. Channels carry no
    /// policy and never pause on their own.
    pub fn interrupt_policy(&self, name: &str, engine_default: Option<InterruptPolicy>) -> InterruptPolicy {
        match self.agents.get(name) {
            Some(agent) => agent.interrupt_policy(engine_default),
            None => InterruptPolicy::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participants::ParticipantKind;

    #[test]
    fn names_are_disjoint_between_agents_and_channels() {
        let mut registry = ParticipantRegistry::new();
        registry.register_agent("a", AgentConfig::default()).unwrap();
        registry
            .register_channel("#g", vec!["a".into()], ChannelConfig::default())
            .unwrap();

        assert!(registry.register_agent("#g", AgentConfig::default()).is_err());
        assert!(registry
            .register_channel("a", vec!["a".into()], ChannelConfig::default())
            .is_err());
    }

    #[test]
    fn channel_requires_members_and_deduplicates() {
        let mut registry = ParticipantRegistry::new();
        assert!(registry
            .register_channel("#empty", vec![], ChannelConfig::default())
            .is_err());

        registry
            .register_channel(
                "#g",
                vec!["a".into(), "b".into(), "a".into()],
                ChannelConfig::default(),
            )
            .unwrap();
        assert_eq!(registry.channel("#g").unwrap().members, vec!["a", "b"]);
        assert_eq!(registry.channel("#g").unwrap().config.max_rounds, 10);
    }

    #[test]
    fn repeated_members_count_once_toward_population() {
        let mut registry = ParticipantRegistry::new();
        registry
            .register_channel(
                "#echo",
                vec!["a".into(), "a".into(), "a".into()],
                ChannelConfig::default(),
            )
            .unwrap();
        registry
            .register_channel(
                "#trio",
                vec!["a".into(), "b".into(), "c".into()],
                ChannelConfig::default(),
            )
            .unwrap();

        let echo = registry.channel("#echo").unwrap();
        assert_eq!(echo.members, vec!["a"]);
        assert!(echo.is_underpopulated());
        assert!(!registry.channel("#trio").unwrap().is_underpopulated());
    }

    #[test]
    fn interrupt_resolution_order() {
        let mut registry = ParticipantRegistry::new();
        registry
            .register_agent(
                "explicit",
                AgentConfig::builder()
                    .kind(ParticipantKind::Assistant)
                    .interrupt(InterruptPolicy::Never)
                    .build(),
            )
            .unwrap();
        registry
            .register_agent(
                "assistant",
                AgentConfig::builder().kind(ParticipantKind::Assistant).build(),
            )
            .unwrap();
        registry.register_agent("plain", AgentConfig::default()).unwrap();

        assert_eq!(
            registry.interrupt_policy("explicit", Some(InterruptPolicy::Always)),
            InterruptPolicy::Never
        );
        assert_eq!(
            registry.interrupt_policy("plain", Some(InterruptPolicy::Always)),
            InterruptPolicy::Always
        );
        assert_eq!(
            registry.interrupt_policy("assistant", Some(InterruptPolicy::Never)),
            InterruptPolicy::Never
        );
        assert_eq!(registry.interrupt_policy("assistant", None), InterruptPolicy::Always);
        assert_eq!(registry.interrupt_policy("plain", None), InterruptPolicy::Never);
        assert_eq!(
            registry.interrupt_policy("#unknown", Some(InterruptPolicy::Always)),
            InterruptPolicy::Never
        );
    }
}
