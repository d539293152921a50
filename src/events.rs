//! Lifecycle events fired by the dispatch engine.
//!
//! Observers implement [`EventObserver`]; every callback has a no-op default
//! so an observer only overrides what it cares about. The engine awaits each
//! observer, in registration order, before it continues dispatching.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AibitatError, ApiErrorKind};
use crate::types::{ChatRecord, Route};

/// Listener for engine lifecycle events.
#[async_trait]
pub trait EventObserver: Send + Sync {
    /// The seed message of a conversation was recorded.
    async fn on_start(&self, _chat: &ChatRecord) {}

    /// A reply was recorded.
    async fn on_message(&self, _chat: &ChatRecord) {}

    /// The conversation paused waiting for feedback on `route`.
    async fn on_interrupt(&self, _route: &Route) {}

    /// The conversation ended; `node` is the participant or channel it ended at.
    async fn on_terminate(&self, _node: &str) {}

    /// A provider failure was recorded for `route`.
    async fn on_error(&self, _route: &Route, _error: &AibitatError) {}
}

/// Serializable form of an engine event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Start {
        chat: ChatRecord,
    },
    Message {
        chat: ChatRecord,
    },
    Interrupt {
        route: Route,
    },
    Terminate {
        node: String,
    },
    Error {
        route: Route,
        message: String,
        kind: Option<ApiErrorKind>,
    },
}

/// Callback receiving [`EngineEvent`]s.
pub type EventSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Observer that forwards every event to a closure.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use aibitat::events::{EngineEvent, SinkObserver};
///
/// let seen = Arc::new(Mutex::new(Vec::<EngineEvent>::new()));
/// let sink = seen.clone();
/// let observer = SinkObserver::new(Arc::new(move |event| sink.lock().unwrap().push(event)));
/// # let _ = observer;
/// ```
pub struct SinkObserver {
    sink: EventSink,
}

impl SinkObserver {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl EventObserver for SinkObserver {
    async fn on_start(&self, chat: &ChatRecord) {
        (self.sink)(EngineEvent::Start { chat: chat.clone() });
    }

    async fn on_message(&self, chat: &ChatRecord) {
        (self.sink)(EngineEvent::Message { chat: chat.clone() });
    }

    async fn on_interrupt(&self, route: &Route) {
        (self.sink)(EngineEvent::Interrupt { route: route.clone() });
    }

    async fn on_terminate(&self, node: &str) {
        (self.sink)(EngineEvent::Terminate {
            node: node.to_string(),
        });
    }

    async fn on_error(&self, route: &Route, error: &AibitatError) {
        (self.sink)(EngineEvent::Error {
            route: route.clone(),
            message: error.to_string(),
            kind: error.api_kind(),
        });
    }
}

/// Observer that logs the conversation through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[async_trait]
impl EventObserver for TracingObserver {
    async fn on_start(&self, chat: &ChatRecord) {
        info!(from = %chat.from, to = %chat.to, content = chat.text(), "conversation started");
    }

    async fn on_message(&self, chat: &ChatRecord) {
        info!(from = %chat.from, to = %chat.to, content = chat.text(), "message");
    }

    async fn on_interrupt(&self, route: &Route) {
        info!(from = %route.from, to = %route.to, "waiting for feedback");
    }

    async fn on_terminate(&self, node: &str) {
        info!(node, "conversation terminated");
    }

    async fn on_error(&self, route: &Route, error: &AibitatError) {
        warn!(from = %route.from, to = %route.to, error = %error, "provider error");
    }
}

/// Ordered set of observers owned by one engine.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn EventObserver>>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) async fn start(&self, chat: &ChatRecord) {
        for observer in &self.observers {
            observer.on_start(chat).await;
        }
    }

    pub(crate) async fn message(&self, chat: &ChatRecord) {
        for observer in &self.observers {
            observer.on_message(chat).await;
        }
    }

    pub(crate) async fn interrupt(&self, route: &Route) {
        for observer in &self.observers {
            observer.on_interrupt(route).await;
        }
    }

    pub(crate) async fn terminate(&self, node: &str) {
        for observer in &self.observers {
            observer.on_terminate(node).await;
        }
    }

    pub(crate) async fn error(&self, route: &Route, error: &AibitatError) {
        for observer in &self.observers {
            observer.on_error(route, error).await;
        }
    }
}
