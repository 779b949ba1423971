//! HTTP server for GitHub webhooks.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::relay::{IncomingRequest, WebhookRelay};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The relay pipeline.
    pub relay: Arc<WebhookRelay>,
}

/// Build the HTTP router.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", post(github_webhook_handler))
        .route("/webhooks/github", post(github_webhook_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` until SIGINT or SIGTERM.
pub async fn run_server(app: Router, listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read local address")?;
    info!(%addr, "Mattermost relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Mattermost relay stopped");
    Ok(())
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handle a GitHub webhook delivery.
async fn github_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = IncomingRequest::from_parts(&headers, body);
    let event = request.event.clone().unwrap_or_default();
    let delivery_id = request.delivery_id.clone().unwrap_or_default();

    match state.relay.handle(request).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            log_failure(&e, &event, &delivery_id);
            e.into_response()
        }
    }
}

fn log_failure(e: &RelayError, event: &str, delivery_id: &str) {
    match e {
        RelayError::DeliveryFailed(_) => error!(
            kind = e.kind(),
            event = %event,
            delivery_id = %delivery_id,
            error = %e,
            "Failed to relay GitHub event"
        ),
        _ => warn!(
            kind = e.kind(),
            event = %event,
            delivery_id = %delivery_id,
            error = %e,
            "Rejected GitHub webhook"
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
