//! The verify -> parse -> format -> forward pipeline.

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::channels::ChatChannel;
use crate::error::RelayError;
use crate::events::{ChatMessage, GithubEvent};
use crate::payload::parse_payload;
use crate::signature::verify_signature;

/// Legacy signature header, any supported algorithm.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";
/// SHA-256 signature header sent alongside the legacy one.
pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";
/// Event type header.
pub const EVENT_HEADER: &str = "X-GitHub-Event";
/// Unique delivery id header.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// The parts of a GitHub webhook request the relay looks at.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub signature: Option<String>,
    pub event: Option<String>,
    pub content_type: Option<String>,
    pub delivery_id: Option<String>,
    pub body: Bytes,
}

impl IncomingRequest {
    /// Extract the relevant headers from an HTTP request.
    ///
    /// The SHA-256 signature header wins when GitHub sends both.
    #[must_use]
    pub fn from_parts(headers: &HeaderMap, body: Bytes) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            signature: get(SIGNATURE_256_HEADER).or_else(|| get(SIGNATURE_HEADER)),
            event: get(EVENT_HEADER),
            content_type: get(header::CONTENT_TYPE.as_str()),
            delivery_id: get(DELIVERY_HEADER),
            body,
        }
    }
}

/// Relays verified GitHub events to a chat channel.
pub struct WebhookRelay {
    secret: String,
    channel: Arc<dyn ChatChannel>,
}

impl WebhookRelay {
    /// Create a relay that verifies with `secret` and posts to `channel`.
    pub fn new(secret: impl Into<String>, channel: Arc<dyn ChatChannel>) -> Self {
        Self {
            secret: secret.into(),
            channel,
        }
    }

    /// Handle one webhook request end to end.
    ///
    /// Returns the message that was delivered. Any error aborts the request
    /// before anything is sent.
    pub async fn handle(&self, request: IncomingRequest) -> Result<ChatMessage, RelayError> {
        let signature = request
            .signature
            .as_deref()
            .ok_or(RelayError::MissingHeader(SIGNATURE_HEADER))?;
        let event_header = request
            .event
            .as_deref()
            .ok_or(RelayError::MissingHeader(EVENT_HEADER))?;

        verify_signature(&self.secret, &request.body, signature)?;

        let payload = parse_payload(request.content_type.as_deref(), &request.body)?;
        let event = GithubEvent::from_header(event_header);
        let message = event.format(payload)?;

        debug!(
            event = event.as_str(),
            channel = self.channel.name(),
            "Forwarding message"
        );
        self.channel.send(&message).await?;

        info!(
            event = event.as_str(),
            delivery_id = request.delivery_id.as_deref().unwrap_or("unknown"),
            username = %message.username,
            "Relayed GitHub event"
        );

        Ok(message)
    }
}
