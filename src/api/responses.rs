//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::WorkoutError,
    history::HistoryRecord,
    services::Announcement,
    state::{SessionStatus, WorkoutState},
};

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub workout: WorkoutState,
    /// Label for the pause/resume control
    pub control_label: String,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, workout: WorkoutState) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            control_label: workout.control_label().to_string(),
            workout,
        }
    }

    /// A workout is counting down (possibly paused)
    pub fn active(message: String, workout: WorkoutState) -> Self {
        Self::new("active", message, workout)
    }

    /// No workout is counting down
    pub fn idle(message: String, workout: WorkoutState) -> Self {
        Self::new("idle", message, workout)
    }
}

/// Full status of the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub workout: SessionStatus,
    pub announcement: Option<Announcement>,
    pub control_label: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// A history record plus its rendered one-line summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(flatten)]
    pub record: HistoryRecord,
    pub summary: String,
}

impl From<HistoryRecord> for HistoryItem {
    fn from(record: HistoryRecord) -> Self {
        Self {
            summary: record.summary(),
            record,
        }
    }
}

/// Newest-first workout history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub records: Vec<HistoryItem>,
}

impl HistoryResponse {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self {
            count: records.len(),
            records: records.into_iter().map(HistoryItem::from).collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body returned with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Workout errors mapped onto HTTP statuses
#[derive(Debug)]
pub struct ApiError(pub WorkoutError);

impl From<WorkoutError> for ApiError {
    fn from(error: WorkoutError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WorkoutError::InvalidConfig { .. } => StatusCode::BAD_REQUEST,
            WorkoutError::AlreadyRunning | WorkoutError::NotRunning => StatusCode::CONFLICT,
            WorkoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
