//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Json};
use serde_json::Value;
use tracing::{info, warn};

use crate::{config::WorkoutConfig, error::WorkoutError, state::AppState};

use super::responses::{ApiError, ApiResponse, HealthResponse, HistoryResponse, StatusResponse};

/// Parse a start request body. Content type is not checked; an empty body
/// reads as an empty object so the first missing field gets reported.
fn parse_body(body: &[u8]) -> Result<Value, WorkoutError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|e| WorkoutError::invalid("body", format!("is not valid JSON: {}", e)))
}

/// Handle POST /workout/start - Validate the configuration and begin a workout
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let config = parse_body(&body)
        .and_then(|body| WorkoutConfig::from_json(&body))
        .map_err(|e| {
            warn!("Rejected workout configuration: {}", e);
            e
        })?;

    let workout = state.session.start(config).await?;
    state.record_action("start");
    info!("Start endpoint called - workout started");
    Ok(Json(ApiResponse::active("Workout started".to_string(), workout)))
}

/// Handle POST /workout/cancel - Abort the workout without saving history
pub async fn cancel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    state.session.cancel().await?;
    state.record_action("cancel");
    info!("Cancel endpoint called - workout discarded");

    let workout = state.session.state().await;
    Ok(Json(ApiResponse::idle("Workout cancelled".to_string(), workout)))
}

/// Handle POST /workout/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let workout = state.session.set_paused(true).await?;
    state.record_action("pause");
    Ok(Json(ApiResponse::active("Workout paused".to_string(), workout)))
}

/// Handle POST /workout/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let workout = state.session.set_paused(false).await?;
    state.record_action("resume");
    Ok(Json(ApiResponse::active("Workout resumed".to_string(), workout)))
}

/// Handle POST /workout/toggle - Flip pause; the response label names the next action
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let workout = state.session.toggle_pause().await?;
    let (action, message) = if workout.paused {
        ("pause", "Workout paused")
    } else {
        ("resume", "Workout resumed")
    };
    state.record_action(action);
    Ok(Json(ApiResponse::active(message.to_string(), workout)))
}

/// Handle GET /workout/status - Return the session snapshot and active announcement
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let workout = state.session.status().await;
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        control_label: workout.state.control_label().to_string(),
        workout,
        announcement: state.notifier.current_announcement(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /history - Finished workouts, newest first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse::new(state.history.list()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
