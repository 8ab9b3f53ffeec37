//! External collaborator adapters
//!
//! One-way side effects the workout core issues to its environment: spoken
//! and displayed notifications, and holding off system sleep while a workout
//! runs. Failures here are logged by the caller and never stop the timer.

pub mod notifier;
pub mod speech;
pub mod wake_lock;

// Re-export main types
pub use notifier::{Announcement, ChannelNotifier, NotificationSink};
pub use speech::Speech;
pub use wake_lock::WakeLock;
