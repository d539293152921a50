//! Shared HTTP client and status classification.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::AibitatError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status onto the classified error family.
///
/// The message keeps the `status: detail` shape so error records stay
/// readable, e.g. `429: Rate limit reached`.
pub fn status_to_error(status: u16, body: &str) -> AibitatError {
    let message = format!("{status}: {}", error_message(body));
    match status {
        401 | 403 => AibitatError::Authorization(message),
        429 => AibitatError::RateLimit(message),
        500..=599 => AibitatError::Server(message),
        _ => AibitatError::Unknown(message),
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn statuses_map_to_api_kinds() {
        let cases = [
            (401, ApiErrorKind::Authorization),
            (403, ApiErrorKind::Authorization),
            (429, ApiErrorKind::RateLimit),
            (500, ApiErrorKind::Server),
            (503, ApiErrorKind::Server),
            (400, ApiErrorKind::Unknown),
            (404, ApiErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(status_to_error(status, "").api_kind(), Some(kind), "status {status}");
        }
    }

    #[test]
    fn message_prefers_json_error_message() {
        let err = status_to_error(429, r#"{"error": {"message": "Rate limit reached"}}"#);
        assert_eq!(err.to_string(), "429: Rate limit reached");

        let err = status_to_error(502, "bad gateway\n");
        assert_eq!(err.to_string(), "502: bad gateway");
    }
}
