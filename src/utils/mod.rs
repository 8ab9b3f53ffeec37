//! Utility functions module
//!
//! Signal handling and text formatting shared across the application.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_clock, format_minutes_seconds, format_uptime};
pub use signals::shutdown_signal;
