//! Tests for configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use aibitat::config::{AibitatConfig, Credentials, DEFAULT_MAX_ROUNDS};
use aibitat::error::AibitatError;
use aibitat::participants::InterruptPolicy;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const ENV_VARS: [&str; 6] = [
    "AIBITAT_MAX_ROUNDS",
    "AIBITAT_INTERRUPT",
    "AIBITAT_SEED",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_COMPAT_BASE_URL",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture() -> Self {
        let saved = ENV_VARS
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in ENV_VARS {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn loads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
max_rounds = 8
max_function_calls = 3
interrupt = "ALWAYS"
provider_timeout_ms = 1500
default_model = "openai:gpt-4o-mini"
"#
    )
    .unwrap();

    let config = AibitatConfig::from_toml_file(file.path()).unwrap();

    assert_eq!(config.max_rounds, 8);
    assert_eq!(config.max_function_calls, 3);
    assert_eq!(config.interrupt, Some(InterruptPolicy::Always));
    assert_eq!(config.provider_timeout_ms, Some(1500));
    assert_eq!(config.default_model, "openai:gpt-4o-mini");
    assert_eq!(config.selector_model, "openai:gpt-4");
}

#[test]
fn missing_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AibitatConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AibitatError::Configuration(_)));
}

#[test]
fn environment_overrides_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture();
    std::env::set_var("AIBITAT_MAX_ROUNDS", "6");
    std::env::set_var("AIBITAT_INTERRUPT", "ALWAYS");
    std::env::set_var("AIBITAT_SEED", "42");

    let config = AibitatConfig::default().with_env_overrides().unwrap();

    assert_eq!(config.max_rounds, 6);
    assert_eq!(config.interrupt, Some(InterruptPolicy::Always));
    assert_eq!(config.seed, Some(42));
}

#[test]
fn untouched_environment_keeps_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture();

    let config = AibitatConfig::default().with_env_overrides().unwrap();

    assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
    assert_eq!(config.interrupt, None);
}

#[test]
fn credentials_read_openai_variables() {
    let _lock = env_lock();
    let _guard = EnvGuard::capture();
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("OPENAI_BASE_URL", "http://localhost:1234/v1");

    let credentials = Credentials::from_env();

    assert_eq!(credentials.api_key("openai").as_deref(), Some("sk-env"));
    assert_eq!(
        credentials.base_url("openai").as_deref(),
        Some("http://localhost:1234/v1")
    );
    assert_eq!(credentials.base_url("openai-compatible"), None);
}
