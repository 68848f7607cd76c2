// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the listing API.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roamer_core::types::{Location, LocationQuery, User};
use roamer_core::{HealthStatus, PluginAdapter, Role, RoamerError};
use serde::Serialize;
use tracing::error;

use crate::server::ApiState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` or `unhealthy`.
    pub status: &'static str,
    /// Set when the store reports a problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A store failure, answered with 500 and a generic message.
#[derive(Debug)]
pub struct ApiError {
    what: &'static str,
    source: RoamerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.source, "failed to load {}", self.what);
        let body = ErrorResponse {
            error: format!("failed to load {}", self.what),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// GET /health
///
/// 200 while the store answers, 503 otherwise.
pub async fn get_health(State(state): State<ApiState>) -> Response {
    let (code, status, reason) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string())),
    };
    let body = HealthResponse {
        status,
        reason,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

/// GET /api/locations
///
/// The whole catalogue, best rated first.
pub async fn list_locations(
    State(state): State<ApiState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    state
        .storage
        .search_locations(&LocationQuery::keyword("*"))
        .await
        .map(Json)
        .map_err(|source| ApiError {
            what: "locations",
            source,
        })
}

/// GET /api/users
///
/// Every registered identity, ordered by id.
pub async fn list_users(State(state): State<ApiState>) -> Result<Json<Vec<User>>, ApiError> {
    let mut users = Vec::new();
    for role in [Role::Requester, Role::Provider, Role::Support] {
        let batch = state
            .storage
            .list_users_by_role(role)
            .await
            .map_err(|source| ApiError {
                what: "users",
                source,
            })?;
        users.extend(batch);
    }
    users.sort_by_key(|u| u.id);
    Ok(Json(users))
}
