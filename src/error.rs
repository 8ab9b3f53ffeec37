//! Error types for workout control

use thiserror::Error;

/// Errors returned by the workout state machine and session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkoutError {
    /// A configuration field was missing, non-numeric or out of range.
    /// Nothing is mutated when this is returned.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("a workout is already running")]
    AlreadyRunning,

    #[error("no workout is running")]
    NotRunning,

    /// Inconsistent state detected during a tick; the scheduler halts
    #[error("internal workout fault: {0}")]
    Internal(String),
}

impl WorkoutError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
