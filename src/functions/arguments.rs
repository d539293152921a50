//! Typed access to parsed function-call arguments.

use serde::de::DeserializeOwned;

use crate::error::AibitatError;

/// Arguments of a function call, already parsed from the model's raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArguments {
    raw: serde_json::Value,
}

impl FunctionArguments {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// Parse the raw argument text the model produced. An empty string is
    /// treated as an empty object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::new(serde_json::json!({})));
        }
        serde_json::from_str(text).map(Self::new)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn get_str(&self, key: &str) -> Result<&str, AibitatError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing(key, "string"))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, AibitatError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| missing(key, "integer"))
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, AibitatError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| missing(key, "number"))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, AibitatError> {
        self.raw
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| missing(key, "boolean"))
    }

    /// Deserialize the whole argument object into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, AibitatError> {
        Ok(serde_json::from_value(self.raw.clone())?)
    }
}

fn missing(key: &str, expected: &str) -> AibitatError {
    AibitatError::InvalidState(format!("argument '{key}' missing or not a {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_empty_text_as_empty_object() {
        let args = FunctionArguments::parse("  ").unwrap();
        assert_eq!(args.raw(), &serde_json::json!({}));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(FunctionArguments::parse("{\"a\": ").is_err());
    }

    #[test]
    fn typed_getters() {
        let args = FunctionArguments::parse(r#"{"q": "rust", "n": 3, "on": true, "x": 1.5}"#).unwrap();
        assert_eq!(args.get_str("q").unwrap(), "rust");
        assert_eq!(args.get_i64("n").unwrap(), 3);
        assert!(args.get_bool("on").unwrap());
        assert_eq!(args.get_f64("x").unwrap(), 1.5);
        assert_eq!(args.get_str_opt("missing"), None);
        assert!(args.get_str("n").is_err());
    }
}
