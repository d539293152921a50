//! Engine configuration and provider credentials.
//!
//! [`AibitatConfig`] is layered: built-in defaults, then an optional TOML
//! document, then `AIBITAT_*` environment variables. [`Credentials`] resolves
//! provider API keys and base URLs (explicit values win over the environment).

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{AibitatError, Result};
use crate::participants::InterruptPolicy;

/// Rounds allowed between two agents when none are configured.
pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Nested function calls allowed within a single turn.
pub const DEFAULT_MAX_FUNCTION_CALLS: usize = 10;

pub const DEFAULT_MODEL: &str = "openai:gpt-3.5-turbo";

/// Speaker selection benefits from stronger reasoning.
pub const DEFAULT_SELECTOR_MODEL: &str = "openai:gpt-4";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct AibitatConfig {
    /// Round limit for any pair of agents.
    #[builder(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,
    /// Engine-level interrupt policy; overrides kind defaults but not an
    /// agent's explicit policy.
    pub interrupt: Option<InterruptPolicy>,
    #[builder(default = DEFAULT_MAX_FUNCTION_CALLS)]
    pub max_function_calls: usize,
    /// Deadline applied to every provider call.
    pub provider_timeout_ms: Option<u64>,
    /// Seed for the speaker-selection fallback RNG.
    pub seed: Option<u64>,
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub default_model: String,
    #[builder(into, default = DEFAULT_SELECTOR_MODEL.to_string())]
    pub selector_model: String,
}

impl Default for AibitatConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AibitatConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AibitatError::Configuration(format!("invalid config: {e}")))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AibitatError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden by the environment (loads `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::default().with_env_overrides()
    }

    /// Apply `AIBITAT_*` environment variables on top of this config.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("AIBITAT_MAX_ROUNDS") {
            self.max_rounds = parse_var("AIBITAT_MAX_ROUNDS", &v)?;
        }
        if let Some(v) = lookup("AIBITAT_INTERRUPT") {
            self.interrupt = Some(parse_var("AIBITAT_INTERRUPT", &v)?);
        }
        if let Some(v) = lookup("AIBITAT_MAX_FUNCTION_CALLS") {
            self.max_function_calls = parse_var("AIBITAT_MAX_FUNCTION_CALLS", &v)?;
        }
        if let Some(v) = lookup("AIBITAT_PROVIDER_TIMEOUT_MS") {
            self.provider_timeout_ms = Some(parse_var("AIBITAT_PROVIDER_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("AIBITAT_SEED") {
            self.seed = Some(parse_var("AIBITAT_SEED", &v)?);
        }
        if let Some(v) = lookup("AIBITAT_DEFAULT_MODEL") {
            self.default_model = v;
        }
        if let Some(v) = lookup("AIBITAT_SELECTOR_MODEL") {
            self.selector_model = v;
        }
        Ok(self)
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AibitatError::Configuration(format!("{key} has invalid value '{value}'")))
}

/// Provider API keys and base URLs.
#[derive(Clone, Default)]
pub struct Credentials {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<String> = self
            .api_keys
            .read()
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("Credentials")
            .field("api_keys", &providers)
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (loads `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let credentials = Self::new();

        let key_mappings = [
            ("OPENAI_API_KEY", "openai"),
            ("OPENAI_COMPAT_API_KEY", "openai-compatible"),
        ];
        for (env_var, provider) in key_mappings {
            if let Ok(key) = std::env::var(env_var) {
                credentials.set_api_key(provider, key);
            }
        }

        let url_mappings = [
            ("OPENAI_BASE_URL", "openai"),
            ("OPENAI_COMPAT_BASE_URL", "openai-compatible"),
        ];
        for (env_var, provider) in url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                credentials.set_base_url(provider, url);
            }
        }

        credentials
    }

    pub fn set_api_key(&self, provider: &str, key: impl Into<String>) {
        if let Ok(mut keys) = self.api_keys.write() {
            keys.insert(provider.to_string(), key.into());
        }
    }

    pub fn api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: impl Into<String>) {
        if let Ok(mut urls) = self.base_urls.write() {
            urls.insert(provider.to_string(), url.into());
        }
    }

    pub fn base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(provider).cloned()
    }
}
