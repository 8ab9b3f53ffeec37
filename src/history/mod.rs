//! Workout history log
//!
//! Finished workouts are kept newest-first in a single JSON array file.

pub mod record;
pub mod store;

pub use record::HistoryRecord;
pub use store::HistoryLog;
