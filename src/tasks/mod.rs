//! Background tasks module
//!
//! The periodic heartbeat that drives an active workout.

pub mod tick_scheduler;

// Re-export main types
pub use tick_scheduler::{TickScheduler, TICK_PERIOD};
