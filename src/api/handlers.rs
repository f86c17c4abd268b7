//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use tracing::{error, warn};

use crate::{
    services::Notification,
    state::{AppState, FocusSession, TimerMode, TimerState, UserStudyAggregate},
};
use super::responses::{
    ApiResponse, ErrorResponse, HealthResponse, ModeRequest, ResetRequest, StatusResponse,
};

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn internal_error(context: &str, e: impl std::fmt::Display) -> HandlerError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, e))),
    )
}

/// Handle GET /timer - Return the current timer
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerState>, HandlerError> {
    state
        .get_timer_state()
        .map(Json)
        .map_err(|e| internal_error("Failed to get timer state", e))
}

/// Handle POST /timer/mode - Select a mode and reset the countdown
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<ApiResponse>, HandlerError> {
    let mode: TimerMode = request.mode.parse().map_err(|e| {
        warn!("Rejected mode selection: {}", e);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(format!("{}", e))))
    })?;

    let timer = state
        .select_mode(mode)
        .map_err(|e| internal_error("Failed to select mode", e))?;

    Ok(Json(ApiResponse::new(format!("Mode set to {}", mode), timer)))
}

/// Handle POST /timer/toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, HandlerError> {
    let timer = state
        .toggle_running()
        .map_err(|e| internal_error("Failed to toggle timer", e))?;

    let message = if timer.is_running { "Timer started" } else { "Timer paused" };
    Ok(Json(ApiResponse::new(message.to_string(), timer)))
}

/// Handle POST /timer/reset - Stop the countdown and restore its duration
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ResetRequest>>,
) -> Result<Json<ApiResponse>, HandlerError> {
    let seconds = request.and_then(|Json(request)| request.seconds);
    let timer = state
        .reset(seconds)
        .map_err(|e| internal_error("Failed to reset timer", e))?;

    Ok(Json(ApiResponse::new("Timer reset".to_string(), timer)))
}

/// Handle GET /sessions - Focus sessions recorded during this run
pub async fn sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FocusSession>>, HandlerError> {
    state
        .get_sessions()
        .map(Json)
        .map_err(|e| internal_error("Failed to get sessions", e))
}

/// Handle GET /notifications - Most recent toasts
pub async fn notifications_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.recent_notifications())
}

/// Handle GET /user - Signed-in user's study totals
pub async fn user_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserStudyAggregate>, HandlerError> {
    state.current_user().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No signed-in user".to_string())),
        )
    })
}

/// Handle GET /status - Timer plus server information
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, HandlerError> {
    let timer = state
        .get_timer_state()
        .map_err(|e| internal_error("Failed to get timer state", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        completed_today: timer.completed_today(Local::now().date_naive()),
        timer,
        signed_in: state.current_user().is_some(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
