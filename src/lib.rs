//! HIIT Timer - An interval-workout timer service
//!
//! Guides a user through configurable work/rest/round-rest phases, announces
//! phase changes, and keeps a local newest-first history of finished workouts.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, WorkoutConfig};
pub use error::WorkoutError;
pub use history::{HistoryLog, HistoryRecord};
pub use state::{AppState, Phase, PhaseMachine, WorkoutEvent, WorkoutSession, WorkoutState};
pub use utils::signals::shutdown_signal;
