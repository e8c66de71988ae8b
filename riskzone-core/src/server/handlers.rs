//! HTTP handlers for the pull channel

use super::state::{AppState, HUB_COMPONENT};
use super::types::{ErrorResponse, ResetResponse};
use crate::health::checks::check_hub;
use crate::health::HealthCheck;
use crate::sync::SyncError;
use crate::zones::{RejectionReason, Zone, ZoneCandidate};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to HTTP callers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    #[error("Sync hub is not running")]
    HubUnavailable,

    #[error("Connection limit reached ({0})")]
    TooManyConnections(usize),

    /// Body is not JSON, or was sent without a JSON content type
    #[error("Undecodable request body: {message}")]
    UndecodableBody { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::HubUnavailable | ApiError::TooManyConnections(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::UndecodableBody { status, .. } => *status,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Rejected(reason) => reason.code(),
            ApiError::HubUnavailable => "hub_unavailable",
            ApiError::TooManyConnections(_) => "too_many_connections",
            ApiError::UndecodableBody { .. } => "undecodable_body",
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Rejected(reason) => ApiError::Rejected(reason),
            SyncError::HubUnavailable => ApiError::HubUnavailable,
            SyncError::TooManyConnections(limit) => ApiError::TooManyConnections(limit),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UndecodableBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            reason: self.reason().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// GET /zones - Current zone list in insertion order
pub async fn list_zones(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Zone>>> {
    let zones = state.hub.snapshot().await?;
    Ok(Json(zones))
}

/// POST /zones - Submit a zone for admission
///
/// Any JSON body reaches the validator; only non-JSON bodies stop here.
pub async fn create_zone(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ZoneCandidate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Zone>)> {
    let Json(candidate) = payload?;
    let zone = state.hub.submit(candidate).await?;
    debug!(zone_id = %zone.id, "Zone created over HTTP");
    Ok((StatusCode::CREATED, Json(zone)))
}

/// DELETE /zones - Clear every zone
pub async fn reset_zones(State(state): State<Arc<AppState>>) -> ApiResult<Json<ResetResponse>> {
    let cleared = state.hub.reset().await?;
    Ok(Json(ResetResponse { cleared }))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthCheck>) {
    let stats = state.hub.stats().await;
    state
        .health
        .record(check_hub(HUB_COMPONENT, stats, state.max_connections))
        .await;

    let report = state.health.check_health().await;
    let status = StatusCode::from_u16(report.status.to_http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report))
}
