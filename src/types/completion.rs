//! Provider completion results.

use serde::{Deserialize, Serialize};

/// A function call requested by the model.
///
/// `arguments` is the raw text the model produced; it is parsed (and may fail
/// to parse) inside the function execution loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Outcome of one provider completion: plain text, or a function call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Completion {
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default)]
    pub cost: f64,
}

impl Completion {
    /// A plain-text completion.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
            function_call: None,
            cost: 0.0,
        }
    }

    /// A function-call completion.
    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            result: None,
            function_call: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
            cost: 0.0,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}
