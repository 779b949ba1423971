//! Mattermost relay binary.
//!
//! Standalone HTTP service receiving GitHub webhooks.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mattermost_relay::{server, Config, LogFormat, MattermostChannel, WebhookRelay};

const DEFAULT_LOG_FILTER: &str = "mattermost_relay=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_tracing(config.log_format);

    config.validate().context("Invalid configuration")?;
    info!(?config, "Starting Mattermost relay");

    let channel = MattermostChannel::from_config(&config)
        .context("Failed to create Mattermost client")?;
    let relay = WebhookRelay::new(config.github_secret.clone(), Arc::new(channel));

    let state = server::AppState {
        relay: Arc::new(relay),
    };
    let app = server::build_router(state, config.max_body_bytes);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .context("Failed to bind to address")?;

    server::run_server(app, listener).await
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
