//! Function trait and closure-based function wrapper.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::arguments::FunctionArguments;
use super::types::FunctionParameters;
use crate::error::Result;
use crate::provider::FunctionSpec;

/// Context available while a function runs.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Name of the participant whose turn invoked the function.
    pub caller: String,
}

/// A callable function a participant may invoke mid-turn.
#[async_trait]
pub trait Function: Send + Sync {
    /// Function name (must match what the model calls).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &FunctionParameters;

    /// Run the function. The returned text is fed back to the model.
    async fn call(&self, args: &FunctionArguments, ctx: &FunctionContext) -> Result<String>;

    /// Definition offered to the provider.
    fn spec(&self) -> FunctionSpec {
        FunctionSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

type FunctionHandler =
    dyn Fn(FunctionArguments, FunctionContext) -> BoxFuture<'static, Result<String>> + Send + Sync;

/// Closure-based function for quick registration.
#[derive(Clone)]
pub struct FunctionDefinition {
    name: String,
    description: String,
    parameters: FunctionParameters,
    handler: Arc<FunctionHandler>,
}

impl FunctionDefinition {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: FunctionParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(FunctionArguments, FunctionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Function for FunctionDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &FunctionParameters {
        &self.parameters
    }

    async fn call(&self, args: &FunctionArguments, ctx: &FunctionContext) -> Result<String> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
