//! Shared test helpers and mock provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use aibitat::error::{AibitatError, Result};
use aibitat::events::{EngineEvent, SinkObserver};
use aibitat::provider::{CompletionRequest, Provider};
use aibitat::types::Completion;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<Completion> + Send + Sync>;

/// A mock provider that replays queued completions, then falls back to a
/// responder (or a fixed "Mock response").
pub struct MockProvider {
    model_id: String,
    queue: Mutex<VecDeque<Result<Completion>>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            model_id: "mock-model".to_string(),
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every request with the same text.
    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::new().with_responder(move |_| Ok(Completion::text(text.clone())))
    }

    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<Completion> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Sleep before answering (use with paused tokio time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_text(self, text: &str) -> Self {
        self.queue_result(Ok(Completion::text(text)))
    }

    pub fn queue_function_call(self, name: &str, arguments: &str) -> Self {
        self.queue_result(Ok(Completion::function_call(name, arguments)))
    }

    pub fn queue_error(self, error: AibitatError) -> Self {
        self.queue_result(Err(error))
    }

    fn queue_result(self, result: Result<Completion>) -> Self {
        self.queue.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(result) = self.queue.lock().unwrap().pop_front() {
            return result;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Ok(Completion::text("Mock response")),
        }
    }
}

/// Whether the request is a next-speaker selection prompt.
pub fn is_selection(request: &CompletionRequest) -> bool {
    request
        .messages
        .iter()
        .any(|message| message.text().contains("select the next role"))
}

/// Observer that collects every event, and a handle to read them back.
pub fn collecting_observer() -> (Arc<SinkObserver>, Arc<Mutex<Vec<EngineEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer = SinkObserver::new(Arc::new(move |event| sink.lock().unwrap().push(event)));
    (Arc::new(observer), events)
}
