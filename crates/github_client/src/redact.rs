//! Redaction of credentials in structured log payloads.

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn, Level};

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;

/// Replacement emitted in place of a sensitive value.
pub const REDACTED: &str = "***REDACTED***";

/// Keys whose values are never logged, compared case-insensitively.
pub const SENSITIVE_KEYS: &[&str] = &[
    "token",
    "github_token",
    "gh_token",
    "authorization",
    "password",
    "secret",
    "api_key",
    "apikey",
    "access_key",
    "private_key",
    "client_secret",
    "refresh_token",
];

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Returns a copy of `value` with every sensitive key's value replaced, at any depth.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let redacted = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_value(inner)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

/// Turns query parameters into a redacted JSON object for logging.
pub fn redact_pairs(pairs: &[(String, String)]) -> Value {
    let map: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    redact_value(&Value::Object(map))
}

/// Emits `event` at `level` with the redacted `payload` attached.
pub fn log_payload(level: Level, event: &str, payload: &Value) {
    let payload = redact_value(payload);
    match level {
        Level::ERROR => error!(event, payload = %payload),
        Level::WARN => warn!(event, payload = %payload),
        Level::INFO => info!(event, payload = %payload),
        _ => debug!(event, payload = %payload),
    }
}
