//! Configuration for the relay service.
//!
//! Every option can be given as a flag or through the environment, which is
//! how the service is normally deployed.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// GitHub caps webhook payloads at 25 MB.
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Relay GitHub webhook events to a Mattermost channel
#[derive(Clone, Parser)]
#[command(name = "mattermost-relay")]
#[command(about = "Relay GitHub webhook events to a Mattermost channel")]
#[command(version)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "RELAY_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Secret configured on the GitHub webhook
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    pub github_secret: String,

    /// Mattermost incoming-webhook URL
    #[arg(long, env = "MATTERMOST_WEBHOOK_URL")]
    pub mattermost_webhook_url: Url,

    /// Accept any TLS certificate from the Mattermost server
    #[arg(long, env = "MATTERMOST_INSECURE_SKIP_TLS_VERIFY")]
    pub insecure_skip_tls_verify: bool,

    /// Timeout for the outbound Mattermost request, in seconds
    #[arg(long, env = "MATTERMOST_REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Largest accepted webhook body, in bytes
    #[arg(long, env = "RELAY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Log output format
    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    /// Build a configuration with defaults for everything but the secret and URL.
    #[must_use]
    pub fn new(github_secret: impl Into<String>, mattermost_webhook_url: Url) -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            github_secret: github_secret.into(),
            mattermost_webhook_url,
            insecure_skip_tls_verify: false,
            request_timeout_secs: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Text,
        }
    }

    /// Check values clap cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        if self.github_secret.trim().is_empty() {
            bail!("GitHub webhook secret must not be empty");
        }

        let scheme = self.mattermost_webhook_url.scheme();
        if scheme != "http" && scheme != "https" {
            bail!("Mattermost webhook URL must use http or https, got '{scheme}'");
        }

        if self.mattermost_webhook_url.host_str().is_none() {
            bail!("Mattermost webhook URL has no host");
        }

        if self.request_timeout_secs == 0 {
            bail!("Request timeout must be at least one second");
        }

        Ok(())
    }

    /// Outbound request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("github_secret", &"<redacted>")
            .field("mattermost_webhook_url", &self.mattermost_webhook_url.as_str())
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook_url() -> Url {
        Url::parse("https://chat.example.com/hooks/abc123").unwrap()
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            "mattermost-relay",
            "--github-secret",
            "s3cret",
            "--mattermost-webhook-url",
            "https://chat.example.com/hooks/abc123",
            "--listen-addr",
            "127.0.0.1:9000",
            "--insecure-skip-tls-verify",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.github_secret, "s3cret");
        assert_eq!(config.mattermost_webhook_url, hook_url());
        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse().unwrap());
        assert!(config.insecure_skip_tls_verify);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_is_rejected_by_parser() {
        let result = Config::try_parse_from([
            "mattermost-relay",
            "--github-secret",
            "s3cret",
            "--mattermost-webhook-url",
            "not a url",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(Config::new("s3cret", hook_url()).validate().is_ok());

        let err = Config::new("  ", hook_url()).validate().unwrap_err();
        assert!(err.to_string().contains("secret"));

        let ftp = Url::parse("ftp://chat.example.com/hooks/abc123").unwrap();
        let err = Config::new("s3cret", ftp).validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));

        let mut config = Config::new("s3cret", hook_url());
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Config::new("s3cret", hook_url()));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
