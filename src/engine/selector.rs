//! Next-speaker selection for channels.

use std::sync::{Arc, OnceLock};

use rand::Rng;
use regex::Regex;
use tracing::{debug, warn};

use super::Aibitat;
use crate::error::Result;
use crate::provider::{CompletionRequest, Provider};
use crate::types::{ChatRecord, Message};

/// Characters models like to wrap a name in.
fn decoration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^[\s@*"'`_\[(<]+|[\s*"'`_.,:;!?\])>]+$"#)
            .expect("speaker decoration regex must compile")
    })
}

/// First line of a model answer with decoration stripped.
pub(crate) fn normalize_speaker(answer: &str) -> String {
    let line = answer.trim().lines().next().unwrap_or_default();
    let line = line.split_once(':').map_or(line, |(name, _)| name);
    decoration().replace_all(line, "").into_owned()
}

/// Prompt asking the model which candidate should speak next.
pub(crate) fn selection_prompt(candidates: &[(String, String)], history: &[&ChatRecord]) -> String {
    let roles = candidates
        .iter()
        .map(|(name, role)| format!("@{name}: {role}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are in a role play game. The following roles are available:\n\
         {roles}\n\n\
         Read the following conversation.\n\n\
         CHAT HISTORY\n\
         {history}\n\n\
         Then select the next role from the list above that is going to speak next. \
         Only return the role name.",
        history = format_history(history),
    )
}

pub(crate) fn format_history(history: &[&ChatRecord]) -> String {
    history
        .iter()
        .map(|chat| format!("@{}: {}", chat.from, chat.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Aibitat {
    /// Pick the member of `channel_name` that speaks next, or `None` when
    /// every member has spent its round budget.
    pub(super) async fn select_next_speaker(&mut self, channel_name: &str) -> Result<Option<String>> {
        let channel = self.participants.channel_or_err(channel_name)?.clone();

        let mut candidates = Vec::with_capacity(channel.members.len());
        for member in &channel.members {
            let agent = self.participants.agent_or_err(member)?;
            let rounds = self
                .ledger
                .addressed_to(channel_name)
                .filter(|chat| &chat.from == member)
                .count();
            if rounds < channel.config.max_rounds {
                candidates.push((member.clone(), agent.system_role().to_string()));
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        if let Some(last) = self.ledger.last_sender_to(channel_name) {
            if candidates.len() > 1 {
                candidates.retain(|(name, _)| name != last);
            }
        }

        let history: Vec<&ChatRecord> = self.ledger.addressed_to(channel_name).collect();
        let request = CompletionRequest::new(vec![
            Message::system(channel.config.role.clone()),
            Message::user(selection_prompt(&candidates, &history)),
        ]);
        let provider = self.selector_for(channel.config.provider.as_ref());
        let completion = self.complete(&provider, &request).await?;

        let suggested = normalize_speaker(completion.result.as_deref().unwrap_or_default());
        if self.participants.is_agent(&suggested) && candidates.iter().any(|(name, _)| *name == suggested) {
            debug!(channel = channel_name, speaker = %suggested, "speaker selected");
            return Ok(Some(suggested));
        }

        let index = self.rng.random_range(0..candidates.len());
        let (fallback, _) = candidates.swap_remove(index);
        warn!(
            channel = channel_name,
            suggested = %suggested,
            speaker = %fallback,
            "provider named an ineligible speaker, picking at random"
        );
        Ok(Some(fallback))
    }

    fn selector_for(&self, channel_provider: Option<&Arc<dyn Provider>>) -> Arc<dyn Provider> {
        channel_provider
            .or(self.selector_provider.as_ref())
            .unwrap_or(&self.default_provider)
            .clone()
    }
}
