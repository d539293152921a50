//! Direct replies and the nested function-call loop.

use std::sync::Arc;

use tracing::{debug, warn};

use super::selector::format_history;
use super::Aibitat;
use crate::error::{AibitatError, Result};
use crate::functions::validation::validate_arguments;
use crate::functions::{Function, FunctionArguments, FunctionContext};
use crate::provider::{CompletionRequest, FunctionSpec, Provider};
use crate::types::{ChatRecord, FunctionCall, Message, Route};

impl Aibitat {
    /// Produce `route.from`'s reply to `route.to`, record it, and return its
    /// text.
    pub(super) async fn reply(&mut self, route: &Route) -> Result<String> {
        let agent = self.participants.agent_or_err(&route.from)?.clone();

        let mut messages = vec![Message::system(agent.system_role())];
        messages.extend(self.history_messages(route));

        let functions = self.functions.resolve(&agent.functions);
        let provider = agent
            .provider
            .clone()
            .unwrap_or_else(|| self.default_provider.clone());

        let content = self
            .run_function_loop(&route.from, &provider, messages, &functions)
            .await?;

        self.record_message(route, content.clone()).await;
        Ok(content)
    }

    /// Conversation history as seen by `route.from`.
    fn history_messages(&self, route: &Route) -> Vec<Message> {
        if self.participants.is_channel(&route.to) {
            let history: Vec<&ChatRecord> = self.ledger.addressed_to(&route.to).collect();
            let prompt = format!(
                "You are in a group chat. Read the conversation and reply as @{from}.\n\n\
                 CHAT HISTORY\n\
                 {history}\n\
                 @{from}:",
                from = route.from,
                history = format_history(&history),
            );
            return vec![Message::user(prompt)];
        }

        self.ledger
            .between(&route.from, &route.to)
            .map(|chat| {
                if chat.from == route.to {
                    Message::user(chat.text())
                } else {
                    Message::assistant(chat.text())
                }
            })
            .collect()
    }

    /// Ask the provider until it answers with text, running every function it
    /// calls along the way.
    async fn run_function_loop(
        &self,
        caller: &str,
        provider: &Arc<dyn Provider>,
        mut messages: Vec<Message>,
        functions: &[Arc<dyn Function>],
    ) -> Result<String> {
        let specs: Vec<FunctionSpec> = functions.iter().map(|f| f.spec()).collect();
        let limit = self.config.max_function_calls;
        let mut calls = 0usize;

        loop {
            let request = CompletionRequest::new(messages.clone()).with_functions(specs.clone());
            let completion = self.complete(provider, &request).await?;

            let Some(call) = completion.function_call else {
                return Ok(completion.result.unwrap_or_default());
            };

            calls += 1;
            if calls > limit {
                warn!(caller, function = %call.name, limit, "function call limit reached");
                return Err(AibitatError::FunctionCallLimit {
                    name: call.name,
                    limit,
                });
            }

            let output = invoke(caller, functions, &call).await?;
            messages.push(Message::function(call.name, output));
        }
    }
}

/// Run one requested call. Anything the model can fix (unknown name, bad
/// arguments, a failing handler) comes back as text for the next completion.
async fn invoke(caller: &str, functions: &[Arc<dyn Function>], call: &FunctionCall) -> Result<String> {
    let Some(function) = functions.iter().find(|f| f.name() == call.name) else {
        warn!(caller, function = %call.name, "function not found");
        return Ok(format!("Function \"{}\" not found. Try again.", call.name));
    };

    let args = match FunctionArguments::parse(&call.arguments) {
        Ok(args) => args,
        Err(err) => {
            debug!(caller, function = %call.name, error = %err, "unparseable arguments");
            return Ok(format!(
                "Invalid arguments for \"{}\": {err}. Try again.",
                call.name
            ));
        }
    };
    if let Err(reason) = validate_arguments(args.raw(), &function.parameters().schema) {
        debug!(caller, function = %call.name, %reason, "arguments rejected");
        return Ok(format!(
            "Invalid arguments for \"{}\": {reason}. Try again.",
            call.name
        ));
    }

    debug!(caller, function = %call.name, "calling function");
    let ctx = FunctionContext {
        caller: caller.to_string(),
    };
    match function.call(&args, &ctx).await {
        Ok(output) => Ok(output),
        Err(AibitatError::Function { message, .. }) => {
            warn!(caller, function = %call.name, error = %message, "function failed");
            Ok(format!("Error: {message}"))
        }
        Err(err) => Err(err),
    }
}
