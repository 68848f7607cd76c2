// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use roamer_config::model::ApiConfig;
use roamer_core::{RoamerError, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct ApiState {
    pub storage: Arc<dyn StorageAdapter>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl ApiState {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            start_time: Instant::now(),
        }
    }
}

/// Routes:
/// - GET /health
/// - GET /api/locations
/// - GET /api/users
pub fn router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/api/locations", get(handlers::list_locations))
        .route("/api/users", get(handlers::list_users));

    Router::new()
        .route("/health", get(handlers::get_health))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `config.host:config.port` and serve until `cancel` fires.
pub async fn start_server(
    config: &ApiConfig,
    state: ApiState,
    cancel: CancellationToken,
) -> Result<(), RoamerError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RoamerError::Channel {
            message: format!("failed to bind api to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!(%addr, "api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RoamerError::Channel {
            message: format!("api server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("api stopped");
    Ok(())
}
