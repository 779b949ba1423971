//! Relay GitHub webhook events to a Mattermost channel.
//!
//! Each request runs through a linear pipeline:
//!
//! 1. [`signature`] checks the HMAC of the raw body against the shared secret
//! 2. [`payload`] decodes the JSON or form-encoded body
//! 3. [`events`] renders a chat message for the event type
//! 4. [`channels::mattermost`] posts the message to the incoming webhook
//!
//! [`WebhookRelay`] ties the steps together and [`server`] exposes it over
//! HTTP.
//!
//! # Configuration
//!
//! See [`Config`]; the binary reads it from flags or environment variables
//! (`GITHUB_WEBHOOK_SECRET`, `MATTERMOST_WEBHOOK_URL`, ...).

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod relay;
pub mod server;
pub mod signature;

pub use channels::mattermost::MattermostChannel;
pub use channels::ChatChannel;
pub use config::{Config, LogFormat};
pub use error::{ChannelError, RelayError};
pub use events::{ChatMessage, GithubEvent};
pub use payload::EventPayload;
pub use relay::{IncomingRequest, WebhookRelay};
