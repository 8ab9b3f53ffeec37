//! State management module
//!
//! The phase state machine, the events it emits, and the session and
//! application state that own it.

pub mod app_state;
pub mod events;
pub mod machine;
pub mod phase;
pub mod session;
pub mod workout_state;

// Re-export main types
pub use app_state::AppState;
pub use events::{DisplayUpdate, WorkoutEvent};
pub use machine::PhaseMachine;
pub use phase::Phase;
pub use session::{SessionStatus, WorkoutSession};
pub use workout_state::WorkoutState;
