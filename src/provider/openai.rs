//! OpenAI (and OpenAI-compatible) Chat Completions provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AibitatError, Result};
use crate::models::LanguageModel;
use crate::types::{Completion, FunctionCall, Message};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{CompletionRequest, Provider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    name: String,
    model: LanguageModel,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(model_id: impl Into<String>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            name: "openai".to_string(),
            model: LanguageModel::new("openai", model_id),
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Override the reported provider name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.model.provider = self.name.clone();
        self
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model.model_id,
            "messages": messages,
        });

        if let (Some(obj), Some(functions)) = (body.as_object_mut(), &request.functions) {
            obj.insert("functions".into(), serde_json::json!(functions));
        }

        body
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn model_id(&self) -> &str {
        &self.model.model_id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = %self.name,
            model = %self.model.model_id,
            messages = request.messages.len(),
            "chat completion"
        );

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AibitatError::Unknown("No choices in completion response".into()))?;

        let cost = match (data.usage, self.model.pricing()) {
            (Some(usage), Some(pricing)) => pricing.cost(usage.prompt_tokens, usage.completion_tokens),
            _ => 0.0,
        };

        Ok(Completion {
            result: choice.message.content,
            function_call: choice.message.function_call.map(|call| FunctionCall {
                name: call.name,
                arguments: call.arguments,
            }),
            cost,
        })
    }
}

fn message_to_openai(msg: &Message) -> serde_json::Value {
    let mut value = serde_json::json!({
        "role": msg.role.to_string(),
        "content": msg.content,
    });
    if let (Some(obj), Some(name)) = (value.as_object_mut(), &msg.name) {
        obj.insert("name".into(), name.clone().into());
    }
    value
}

// API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    function_call: Option<OpenAiFunctionCall>,
}

#[derive(Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
