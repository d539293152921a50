//! The dispatch engine.
//!
//! [`Aibitat`] owns the participant and function registries, the ledger and
//! the observers of one conversation. Dispatch is an explicit loop over
//! routes: a route whose sender is a channel is a relay step (pick the next
//! member to speak), any other route is a direct turn (the sender replies).
//! The loop halts on terminate, interrupt, or a recorded provider error.
//!
//! ```no_run
//! use std::sync::Arc;
//! use aibitat::prelude::*;
//!
//! # async fn example(provider: Arc<dyn Provider>) -> aibitat::error::Result<()> {
//! let mut aibitat = Aibitat::new(AibitatConfig::default(), provider);
//! aibitat
//!     .agent("🧑", AgentConfig::builder().interrupt(InterruptPolicy::Always).build())?
//!     .agent("🤖", AgentConfig::default())?;
//! aibitat.start(StartMessage::new("🧑", "🤖", "2 + 2 = 4?")).await?;
//! println!("{:#?}", aibitat.chats());
//! # Ok(())
//! # }
//! ```

mod reply;
mod selector;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AibitatConfig, Credentials};
use crate::error::{AibitatError, ApiErrorKind, Result};
use crate::events::{EventObserver, Observers};
use crate::functions::{Function, FunctionRegistry};
use crate::ledger::Ledger;
use crate::models::LanguageModel;
use crate::participants::{AgentConfig, ChannelConfig, InterruptPolicy, ParticipantRegistry};
use crate::provider::{self, CompletionRequest, Provider};
use crate::types::{ChatRecord, ChatState, Completion, Route, StartMessage, INTERRUPT, TERMINATE};
use crate::util::timeout::with_timeout;

/// One conversation engine instance.
pub struct Aibitat {
    id: Uuid,
    config: AibitatConfig,
    participants: ParticipantRegistry,
    functions: FunctionRegistry,
    ledger: Ledger,
    observers: Observers,
    default_provider: Arc<dyn Provider>,
    selector_provider: Option<Arc<dyn Provider>>,
    rng: StdRng,
    cancel: Option<CancellationToken>,
}

impl Aibitat {
    /// Create an engine whose participants use `provider` unless they
    /// override it.
    pub fn new(config: AibitatConfig, provider: Arc<dyn Provider>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            id: Uuid::new_v4(),
            config,
            participants: ParticipantRegistry::new(),
            functions: FunctionRegistry::new(),
            ledger: Ledger::new(),
            observers: Observers::default(),
            default_provider: provider,
            selector_provider: None,
            rng,
            cancel: None,
        }
    }

    /// Create an engine with built-in providers for the configured default
    /// and selector models.
    pub fn from_config(config: AibitatConfig, credentials: &Credentials) -> Result<Self> {
        let default_model: LanguageModel = config.default_model.parse()?;
        let selector_model: LanguageModel = config.selector_model.parse()?;
        let default_provider = provider::create_provider(&default_model, credentials)?;
        let selector_provider = provider::create_provider(&selector_model, credentials)?;
        Ok(Self::new(config, default_provider).with_selector_provider(selector_provider))
    }

    /// Provider used to pick the next speaker in channels without their own
    /// provider. Defaults to the engine's default provider.
    pub fn with_selector_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.selector_provider = Some(provider);
        self
    }

    /// Start from an existing conversation history.
    pub fn with_chats(mut self, chats: Vec<ChatRecord>) -> Self {
        self.ledger = Ledger::with_records(chats);
        self
    }

    /// Register (or re-register) an agent.
    pub fn agent(&mut self, name: impl Into<String>, config: AgentConfig) -> Result<&mut Self> {
        self.participants.register_agent(name, config)?;
        Ok(self)
    }

    /// Register (or re-register) a channel over `members`.
    pub fn channel<I, S>(&mut self, name: impl Into<String>, members: I, config: ChannelConfig) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.participants.register_channel(name, members, config)?;
        Ok(self)
    }

    /// Register a callable function.
    pub fn function(&mut self, function: impl Function + 'static) -> &mut Self {
        self.functions.register(Arc::new(function));
        self
    }

    /// Register several callable functions.
    pub fn functions(&mut self, functions: impl IntoIterator<Item = Arc<dyn Function>>) -> &mut Self {
        for function in functions {
            self.functions.register(function);
        }
        self
    }

    /// Subscribe an observer to lifecycle events.
    pub fn observe(&mut self, observer: Arc<dyn EventObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    /// Cancel in-flight provider calls (and further dispatch) when `token`
    /// fires. Cancellation is recorded as an `error` record.
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.cancel = Some(token);
    }

    /// The conversation so far.
    pub fn chats(&self) -> &[ChatRecord] {
        self.ledger.records()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &AibitatConfig {
        &self.config
    }

    pub fn participants(&self) -> &ParticipantRegistry {
        &self.participants
    }

    pub fn conversation_id(&self) -> Uuid {
        self.id
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Kind of the failure the conversation is paused on, if it is paused
    /// on an `error` record. An error record without a stored kind reads as
    /// [`ApiErrorKind::Unknown`].
    pub fn last_error_kind(&self) -> Option<ApiErrorKind> {
        match self.ledger.last() {
            Some(record) if record.state == ChatState::Error => {
                Some(record.error_kind.unwrap_or(ApiErrorKind::Unknown))
            }
            _ => None,
        }
    }

    /// Record `message` and let its recipient answer. Returns once the
    /// conversation terminates, is interrupted, or pauses on an error.
    pub async fn start(&mut self, message: StartMessage) -> Result<()> {
        self.participants.ensure_known(&message.from)?;
        self.participants.ensure_known(&message.to)?;

        let route = message.route();
        debug!(conversation = %self.id, %route, "start");
        let record = self.record_message(&route, message.content).await;
        self.observers.start(&record).await;

        self.dispatch(route.reversed(), true).await
    }

    /// Resume an interrupted conversation. With `feedback`, the feedback is
    /// recorded as the interrupted participant's message and the other party
    /// answers it; without, the interrupted participant takes its turn.
    ///
    /// Channels never author content: when the pending turn belongs to a
    /// channel, the feedback is credited to the member on the other end and
    /// the channel then picks the next speaker.
    pub async fn continue_chat(&mut self, feedback: Option<&str>) -> Result<()> {
        let route = match self.ledger.last() {
            Some(record) if record.state == ChatState::Interrupt => record.route(),
            _ => {
                return Err(AibitatError::InvalidState(
                    "no interrupted chat to continue".into(),
                ))
            }
        };
        if self.has_reached_maximum_rounds(&route.from, &route.to)? {
            return Err(AibitatError::MaximumRounds {
                from: route.from,
                to: route.to,
            });
        }
        self.ledger.pop_if(ChatState::Interrupt);

        match feedback {
            Some(text) => {
                let author = if self.participants.is_channel(&route.from) {
                    route.reversed()
                } else {
                    route
                };
                self.record_message(&author, text).await;
                self.dispatch(author.reversed(), true).await
            }
            None => self.dispatch(route, true).await,
        }
    }

    /// Replay the turn that failed with a provider error.
    pub async fn retry(&mut self) -> Result<()> {
        let Some(record) = self.ledger.pop_if(ChatState::Error) else {
            return Err(AibitatError::InvalidState("no failed chat to retry".into()));
        };
        debug!(conversation = %self.id, route = %record.route(), "retry");
        self.dispatch(record.route(), true).await
    }

    /// Run a single dispatch step for `from -> to` without continuing the
    /// conversation afterwards.
    pub async fn step(&mut self, from: &str, to: &str) -> Result<()> {
        self.participants.ensure_known(from)?;
        self.participants.ensure_known(to)?;
        self.dispatch(Route::new(from, to), false).await
    }

    /// Whether the round budget for `from <-> to` is spent.
    ///
    /// Between two agents this counts their successful exchanges against the
    /// engine's `max_rounds`. When either side is a channel it counts the
    /// successful replies its members addressed to the channel against the
    /// channel's own `max_rounds`.
    pub fn has_reached_maximum_rounds(&self, from: &str, to: &str) -> Result<bool> {
        let channel_name = if self.participants.is_channel(to) {
            Some(to)
        } else if self.participants.is_channel(from) {
            Some(from)
        } else {
            None
        };

        match channel_name {
            Some(name) => {
                let channel = self.participants.channel_or_err(name)?;
                let rounds = self
                    .ledger
                    .addressed_to(name)
                    .filter(|record| channel.has_member(&record.from))
                    .count();
                Ok(rounds >= channel.config.max_rounds)
            }
            None => Ok(self.ledger.between(from, to).count() >= self.config.max_rounds),
        }
    }

    async fn dispatch(&mut self, mut route: Route, keep_alive: bool) -> Result<()> {
        loop {
            if self.is_cancelled() {
                self.record_error(&route, AibitatError::Cancelled).await;
                return Ok(());
            }

            let next = if self.participants.is_channel(&route.from) {
                self.relay(&route).await?
            } else {
                self.direct_turn(&route, keep_alive).await?
            };

            match next {
                Some(next) => route = next,
                None => return Ok(()),
            }
        }
    }

    /// Channel step: pick a member and hand the turn to it.
    async fn relay(&mut self, route: &Route) -> Result<Option<Route>> {
        let channel = route.from.as_str();
        let speaker = match self.select_next_speaker(channel).await {
            Ok(speaker) => speaker,
            Err(err) if err.is_api_error() => {
                self.record_error(route, err).await;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let Some(speaker) = speaker else {
            debug!(conversation = %self.id, channel, "no eligible speaker");
            self.observers.terminate(channel).await;
            return Ok(None);
        };

        let next = Route::new(speaker, channel);
        if self.should_interrupt(&next.from) || self.has_reached_maximum_rounds(&next.from, &next.to)? {
            self.record_interrupt(&next).await;
            return Ok(None);
        }
        Ok(Some(next))
    }

    /// Direct step: `route.from` replies to `route.to`.
    async fn direct_turn(&mut self, route: &Route, keep_alive: bool) -> Result<Option<Route>> {
        let reply = match self.reply(route).await {
            Ok(reply) => reply,
            Err(err) if err.is_api_error() => {
                self.record_error(route, err).await;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if reply.trim() == TERMINATE || self.has_reached_maximum_rounds(&route.from, &route.to)? {
            debug!(conversation = %self.id, %route, "terminate");
            self.observers.terminate(&route.to).await;
            return Ok(None);
        }

        let next = route.reversed();
        if reply.trim() == INTERRUPT || self.should_interrupt(&route.to) {
            self.record_interrupt(&next).await;
            return Ok(None);
        }

        Ok(keep_alive.then_some(next))
    }

    fn should_interrupt(&self, name: &str) -> bool {
        self.participants.interrupt_policy(name, self.config.interrupt) == InterruptPolicy::Always
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    async fn record_message(&mut self, route: &Route, content: impl Into<String>) -> ChatRecord {
        let record = ChatRecord::success(route, content);
        self.ledger.push(record.clone());
        self.observers.message(&record).await;
        record
    }

    async fn record_interrupt(&mut self, route: &Route) {
        debug!(conversation = %self.id, %route, "interrupt");
        self.ledger.push(ChatRecord::interrupt(route));
        self.observers.interrupt(route).await;
    }

    async fn record_error(&mut self, route: &Route, error: AibitatError) {
        warn!(conversation = %self.id, %route, error = %error, "turn failed");
        let kind = error.api_kind().unwrap_or(ApiErrorKind::Unknown);
        self.ledger.push(ChatRecord::error(route, error.to_string(), kind));
        self.observers.error(route, &error).await;
    }

    /// One provider completion, bounded by the configured timeout and the
    /// cancellation token.
    async fn complete(&self, provider: &Arc<dyn Provider>, request: &CompletionRequest) -> Result<Completion> {
        debug!(
            conversation = %self.id,
            provider = provider.provider_name(),
            model = provider.model_id(),
            "provider call"
        );
        let call = async {
            match self.config.provider_timeout() {
                Some(limit) => with_timeout(limit, provider.complete(request)).await,
                None => provider.complete(request).await,
            }
        };
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(AibitatError::Cancelled),
                result = call => result,
            },
            None => call.await,
        }
    }
}

impl std::fmt::Debug for Aibitat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aibitat")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("participants", &self.participants)
            .field("functions", &self.functions)
            .field("chats", &self.ledger.len())
            .finish()
    }
}
