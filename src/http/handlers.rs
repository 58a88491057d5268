//! Request handlers for the ladder API
//!
//! Handlers are thin: they pull the relevant service out of the shared
//! AppState and translate domain errors into status codes.

use crate::error::LadderError;
use crate::service::{AppState, HealthCheck, HealthStatus, Leaderboard, ResolvedMatch};
use crate::types::{Match, MatchId, NewPlayer, PlayerId};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Error wrapper that renders domain failures as JSON
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self(error)
    }
}

/// Status code for a domain error
pub fn status_for(error: &LadderError) -> StatusCode {
    match error {
        LadderError::DuplicatePlayer { .. } => StatusCode::CONFLICT,
        LadderError::InvalidPlayer { .. }
        | LadderError::SelfPlay { .. }
        | LadderError::UnresolvedPlayers { .. }
        | LadderError::InvalidResolution { .. }
        | LadderError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        LadderError::PlayerNotFound { .. } | LadderError::MatchNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        LadderError::SubmissionInProgress => StatusCode::TOO_MANY_REQUESTS,
        LadderError::ResolverFailed { .. } => StatusCode::BAD_GATEWAY,
        LadderError::ConfigurationError { .. } | LadderError::InternalError { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self.0.downcast_ref::<LadderError>() {
            Some(e) => (status_for(e), e.code()),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        } else {
            debug!("Request rejected ({}): {}", code, self.0);
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON body extractor whose rejections use the API error shape
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> ApiResult<Self> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(
                LadderError::InvalidRequest {
                    reason: rejection.body_text(),
                }
                .into(),
            )),
        }
    }
}

/// Body of text submissions
#[derive(Debug, Deserialize)]
pub struct MatchText {
    pub text: String,
}

/// Root endpoint handler - shows service information
pub async fn root_handler(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": app.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/ready",
            "/metrics",
            "/leaderboard",
            "/dashboard",
            "/players",
            "/matches",
            "/matches/resolved"
        ]
    }))
}

pub async fn health_handler(State(app): State<Arc<AppState>>) -> Response {
    debug!("Health check requested");

    match HealthCheck::check(&app).await {
        Ok(health) => {
            let status = match health.status {
                HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
                HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(health)).into_response()
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Readiness probe: running and able to read the store
pub async fn ready_handler(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    match HealthCheck::readiness_check(&app).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(app): State<Arc<AppState>>) -> Response {
    let metric_families = app.metrics().registry().gather();
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Leaderboard for the store's current snapshot
async fn current_leaderboard(app: &AppState) -> crate::error::Result<Arc<Leaderboard>> {
    let snapshot = app.store().snapshot().await?;
    Ok(app.leaderboard().current(&snapshot))
}

pub async fn leaderboard_handler(
    State(app): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let leaderboard = current_leaderboard(&app).await?;
    Ok(Json(leaderboard.as_ref().clone()))
}

pub async fn dashboard_handler(State(app): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let leaderboard = current_leaderboard(&app).await?;
    Ok(Json(leaderboard.dashboard.clone()))
}

pub async fn list_players(State(app): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(app.roster().list_players().await?))
}

pub async fn register_player(
    State(app): State<Arc<AppState>>,
    ApiJson(player): ApiJson<NewPlayer>,
) -> ApiResult<impl IntoResponse> {
    let player = app.roster().register_player(player).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn edit_player(
    State(app): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
    ApiJson(player): ApiJson<NewPlayer>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(app.roster().edit_player(&player_id, player).await?))
}

pub async fn delete_player(
    State(app): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<StatusCode> {
    app.roster().delete_player(&player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recorded matches in replay order
pub async fn list_matches(State(app): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let mut matches: Vec<Match> = app.store().matches().await?.as_ref().clone();
    matches.sort_by_key(|m| m.timestamp);
    Ok(Json(matches))
}

pub async fn submit_match(
    State(app): State<Arc<AppState>>,
    ApiJson(body): ApiJson<MatchText>,
) -> ApiResult<impl IntoResponse> {
    let recorded = app.submissions().submit_text(&body.text).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn submit_resolved_match(
    State(app): State<Arc<AppState>>,
    ApiJson(resolved): ApiJson<ResolvedMatch>,
) -> ApiResult<impl IntoResponse> {
    let recorded = app.submissions().submit_resolved(resolved).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn edit_match(
    State(app): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
    ApiJson(body): ApiJson<MatchText>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(app.submissions().edit_match(&match_id, &body.text).await?))
}

pub async fn delete_match(
    State(app): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<StatusCode> {
    app.submissions().delete_match(&match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
