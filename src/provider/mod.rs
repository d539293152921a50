//! Language-model provider boundary.
//!
//! The engine only consumes [`Provider::complete`]; adapters must report
//! transport, credential, throttling and server failures with one of the
//! classified [`AibitatError`] kinds.

pub mod http;

#[cfg(feature = "openai")]
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Credentials;
use crate::error::{AibitatError, Result};
use crate::models::LanguageModel;
use crate::types::{Completion, Message};

/// Function definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A request sent to a provider.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub functions: Option<Vec<FunctionSpec>>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            functions: None,
        }
    }

    /// Attach function definitions; an empty list is sent as none.
    pub fn with_functions(mut self, functions: Vec<FunctionSpec>) -> Self {
        self.functions = (!functions.is_empty()).then_some(functions);
        self
    }
}

/// Core trait implemented by all providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Produce one completion: plain text or a function call.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Create a built-in provider for the given model.
#[allow(unused_variables)]
pub fn create_provider(model: &LanguageModel, credentials: &Credentials) -> Result<Arc<dyn Provider>> {
    match model.provider.as_str() {
        #[cfg(feature = "openai")]
        "openai" => {
            let api_key = credentials
                .api_key("openai")
                .ok_or_else(|| AibitatError::Authorization("Missing OPENAI_API_KEY".into()))?;
            Ok(Arc::new(openai::OpenAiProvider::new(
                model.model_id.clone(),
                api_key,
                credentials.base_url("openai"),
            )))
        }
        #[cfg(feature = "openai")]
        "openai-compatible" => {
            let api_key = credentials
                .api_key("openai-compatible")
                .or_else(|| credentials.api_key("openai"))
                .ok_or_else(|| AibitatError::Authorization("Missing OPENAI_COMPAT_API_KEY".into()))?;
            let base_url = credentials
                .base_url("openai-compatible")
                .ok_or_else(|| AibitatError::Configuration("Missing OPENAI_COMPAT_BASE_URL".into()))?;
            Ok(Arc::new(
                openai::OpenAiProvider::new(model.model_id.clone(), api_key, Some(base_url))
                    .with_name("openai-compatible"),
            ))
        }
        other => Err(AibitatError::Configuration(format!(
            "No built-in provider for '{other}' (model '{model}')"
        ))),
    }
}
