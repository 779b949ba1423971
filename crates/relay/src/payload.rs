//! Decoding of GitHub webhook bodies.
//!
//! GitHub delivers either a bare JSON document or a URL-encoded form whose
//! `payload` field holds the JSON document, depending on how the webhook was
//! configured.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RelayError;

/// Name of the form field carrying the JSON document.
const FORM_PAYLOAD_FIELD: &str = "payload";

/// Body encodings GitHub can be configured to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    FormUrlEncoded,
}

impl ContentType {
    /// Resolve a `Content-Type` header value, ignoring media type parameters.
    pub fn from_header(value: Option<&str>) -> Result<Self, RelayError> {
        let raw = value.unwrap_or_default();
        let essence = raw.split(';').next().unwrap_or_default().trim();

        if essence.eq_ignore_ascii_case("application/json") {
            Ok(Self::Json)
        } else if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Ok(Self::FormUrlEncoded)
        } else {
            Err(RelayError::UnsupportedContentType(raw.to_string()))
        }
    }
}

/// A decoded GitHub event document.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload(Map<String, Value>);

impl EventPayload {
    /// Decode a JSON document that must be an object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RelayError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RelayError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserialize the payload into a typed event view.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, RelayError> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }
}

/// Decode a request body according to its content type.
pub fn parse_payload(content_type: Option<&str>, body: &[u8]) -> Result<EventPayload, RelayError> {
    match ContentType::from_header(content_type)? {
        ContentType::Json => EventPayload::from_json(body),
        ContentType::FormUrlEncoded => {
            let payload = url::form_urlencoded::parse(body)
                .find(|(key, _)| key == FORM_PAYLOAD_FIELD)
                .map(|(_, value)| value)
                .ok_or_else(|| {
                    RelayError::MalformedPayload(format!(
                        "form body has no '{FORM_PAYLOAD_FIELD}' field"
                    ))
                })?;

            EventPayload::from_json(payload.as_bytes())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Typed event views
// =============================================================================

/// GitHub repository (simplified)
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Full name (org/repo)
    pub full_name: String,
}

/// User who triggered the event
#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    /// User login
    pub login: String,
    /// Avatar image URL
    pub avatar_url: String,
}

/// Single commit of a push
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    /// Full commit message
    pub message: String,
}

/// `create` and `delete` event payload
#[derive(Debug, Clone, Deserialize)]
pub struct RefEvent {
    /// Branch or tag name
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub repository: Repository,
    pub sender: Sender,
}

/// `push` event payload
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed (refs/heads/...)
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub repository: Repository,
    pub sender: Sender,
    /// Pushed commits, oldest first
    #[serde(default)]
    pub commits: Vec<Commit>,
}
