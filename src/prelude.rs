//! Convenience re-exports for common use.

pub use crate::config::{AibitatConfig, Credentials};
pub use crate::engine::Aibitat;
pub use crate::error::{AibitatError, ApiErrorKind, Result};
pub use crate::events::{EngineEvent, EventObserver, SinkObserver, TracingObserver};
pub use crate::functions::{Function, FunctionArguments, FunctionContext, FunctionDefinition, FunctionParameters};
pub use crate::models::LanguageModel;
pub use crate::participants::{AgentConfig, ChannelConfig, InterruptPolicy, ParticipantKind};
pub use crate::provider::{CompletionRequest, Provider};
pub use crate::types::{ChatRecord, ChatState, Completion, Message, Role, Route, StartMessage, INTERRUPT, TERMINATE};
pub use crate::util::retry::RetryPolicy;
