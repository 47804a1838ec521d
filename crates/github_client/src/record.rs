//! The opaque JSON object returned by GitHub list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

/// One resource from a list endpoint: a workflow run, release, cache, package,
/// package version, analysis, alert or user.
///
/// Only a handful of fields are interpreted; everything else passes through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric `id`. Numeric strings are accepted since some package endpoints
    /// return version ids as strings.
    pub fn id(&self) -> Option<u64> {
        self.identifier("id")
    }

    /// Alert `number`.
    pub fn number(&self) -> Option<u64> {
        self.identifier("number")
    }

    /// Integer value of `key`, from a JSON number or a numeric string.
    pub fn identifier(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(parse_identifier)
    }

    pub fn login(&self) -> Option<&str> {
        self.str_field("login")
    }

    /// Whether an analysis is marked safe to delete. Absent means `false`.
    pub fn deletable(&self) -> bool {
        self.0
            .get("deletable")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The `tool.name` of an analysis or alert.
    pub fn tool_name(&self) -> Option<&str> {
        self.0
            .get("tool")
            .and_then(|tool| tool.get("name"))
            .and_then(Value::as_str)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// First non-empty string among `keys`, used for log labels.
    pub fn label(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.str_field(k))
            .find(|v| !v.is_empty())
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Parses an identifier that may arrive as an integer or a numeric string.
pub fn parse_identifier(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
