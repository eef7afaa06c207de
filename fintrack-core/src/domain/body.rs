//! Response body as returned to callers

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::result::{Error, Result};

/// Response body: JSON when it parses, otherwise the raw text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedBody {
    Json(JsonValue),
    Text(String),
}

impl ParsedBody {
    /// Parse response text, keeping it verbatim if it is not JSON
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(t) => Some(t),
        }
    }

    /// Look up a top-level field of a JSON object body
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.as_json().and_then(|v| v.get(field))
    }

    /// Convert into a JSON value; raw text becomes a JSON string
    pub fn into_json(self) -> JsonValue {
        match self {
            Self::Json(v) => v,
            Self::Text(t) => JsonValue::String(t),
        }
    }

    /// Deserialize a JSON body into `T`
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(v) => serde_json::from_value(v)
                .map_err(|e| Error::invalid_response(format!("unexpected payload shape: {}", e))),
            Self::Text(t) => Err(Error::invalid_response(format!(
                "expected JSON, got text: {}",
                truncate(&t, 120)
            ))),
        }
    }

    /// Message for a failed response
    ///
    /// `detail` wins when present and truthy, then the body itself, then
    /// a generic `HTTP <status>`.
    pub fn error_message(&self, status: StatusCode) -> String {
        let message = match self {
            Self::Json(value) => match value.get("detail").filter(|d| is_truthy(d)) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => value.to_string(),
            },
            Self::Text(text) => text.clone(),
        };

        if message.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            message
        }
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
