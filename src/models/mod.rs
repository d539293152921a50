//! Model identifiers and pricing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AibitatError;

/// A `provider:model` pair, e.g. `openai:gpt-4o`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LanguageModel {
    pub provider: String,
    pub model_id: String,
}

impl LanguageModel {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }

    /// Per-million-token prices, when the model is known.
    pub fn pricing(&self) -> Option<ModelPricing> {
        pricing_for(&self.model_id)
    }
}

impl FromStr for LanguageModel {
    type Err = AibitatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((provider, model_id)) if !provider.is_empty() && !model_id.is_empty() => {
                Ok(Self::new(provider, model_id))
            }
            _ => Err(AibitatError::Configuration(format!(
                "invalid model '{s}', expected provider:model (e.g. openai:gpt-4o)"
            ))),
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model_id)
    }
}

/// USD price per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_m: f64,
    pub output_per_m: f64,
}

impl ModelPricing {
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * self.input_per_m
            + (output_tokens as f64 / 1_000_000.0) * self.output_per_m
    }
}

fn pricing_for(model_id: &str) -> Option<ModelPricing> {
    let (input_per_m, output_per_m) = match model_id {
        "gpt-3.5-turbo" => (0.5, 1.5),
        "gpt-4" => (30.0, 60.0),
        "gpt-4-turbo" => (10.0, 30.0),
        "gpt-4o" => (2.5, 10.0),
        "gpt-4o-mini" => (0.15, 0.6),
        _ => return None,
    };
    Some(ModelPricing {
        input_per_m,
        output_per_m,
    })
}
