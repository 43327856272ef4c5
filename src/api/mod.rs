//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the league queries, a chat-style command
//! endpoint and the spreadsheet update webhook. Every request acquires its
//! own snapshot from the configured data source.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::calculate::{EngineError, League};
use crate::commands::CommandError;
use crate::fetch::{acquire_snapshot, SourceError};

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::SourceUnavailable(_) => (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::PlayerNotFound(_) => ApiError::NotFound(err.to_string()),
            EngineError::SamePlayer(_) => ApiError::BadRequest(err.to_string()),
            EngineError::EmptyRoster => ApiError::SourceUnavailable(err.to_string()),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Engine(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        error!("Data source failed: {}", err);
        ApiError::SourceUnavailable(err.to_string())
    }
}

/// Fetch a fresh snapshot and normalize it.
pub async fn load_league(state: &AppState) -> Result<League, ApiError> {
    let snapshot = acquire_snapshot(state.source.as_ref()).await?;
    Ok(League::from_snapshot(&snapshot, state.league.settings())?)
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/commands", get(routes::commands::list))
        .route("/api/command", post(routes::commands::run))
        .route("/api/standings", get(routes::league::standings))
        .route("/api/stats/:player", get(routes::league::stats))
        .route("/api/remaining/:player", get(routes::league::remaining))
        .route("/api/streaks/:kind", get(routes::league::streaks))
        .route("/api/pvp", get(routes::league::pvp))
        .route("/api/pvp-matrix", get(routes::league::pvp_matrix))
        .route("/api/pvp-matrix/heatmap", get(routes::league::heatmap))
        .route("/sheet-update", post(routes::webhook::sheet_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS layer for a configured origin; `*` allows any.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}
