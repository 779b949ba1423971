//! Mattermost incoming-webhook channel.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::channels::ChatChannel;
use crate::config::Config;
use crate::error::ChannelError;
use crate::events::ChatMessage;

/// User agent sent with every webhook request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Mattermost incoming-webhook channel.
pub struct MattermostChannel {
    webhook_url: Url,
    client: reqwest::Client,
}

impl MattermostChannel {
    /// Create a channel posting to `webhook_url`.
    ///
    /// `verify_tls = false` accepts any server certificate; only meant for
    /// self-hosted instances with private certificates.
    pub fn new(webhook_url: Url, timeout: Duration, verify_tls: bool) -> Result<Self, ChannelError> {
        if !verify_tls {
            warn!(url = %webhook_url, "TLS certificate verification disabled for Mattermost");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| ChannelError::Client(e.to_string()))?;

        Ok(Self {
            webhook_url,
            client,
        })
    }

    /// Create a channel from the relay configuration.
    pub fn from_config(config: &Config) -> Result<Self, ChannelError> {
        Self::new(
            config.mattermost_webhook_url.clone(),
            config.request_timeout(),
            !config.insecure_skip_tls_verify,
        )
    }

    /// The configured webhook URL.
    #[must_use]
    pub fn webhook_url(&self) -> &Url {
        &self.webhook_url
    }
}

#[async_trait]
impl ChatChannel for MattermostChannel {
    fn name(&self) -> &'static str {
        "mattermost"
    }

    async fn send(&self, message: &ChatMessage) -> Result<(), ChannelError> {
        debug!(channel = "mattermost", username = %message.username, "Sending message");

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(message)
            .send()
            .await?;

        if response.status().is_success() {
            debug!(channel = "mattermost", "Message delivered");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "mattermost",
                status = %status,
                body = %body,
                "Mattermost webhook request failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
