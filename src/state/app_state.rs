//! Application state shared with HTTP handlers

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    history::HistoryLog,
    services::{ChannelNotifier, NotificationSink, WakeLock},
    utils::format_uptime,
};

use super::WorkoutSession;

/// Everything the HTTP layer needs: the workout session plus server metadata
pub struct AppState {
    pub session: WorkoutSession,
    pub history: Arc<HistoryLog>,
    /// Holds the active announcement shown by the status endpoint
    pub notifier: Arc<ChannelNotifier>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last control action and when it happened
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        history_file: impl Into<PathBuf>,
        notifier: Arc<ChannelNotifier>,
        wake_lock: WakeLock,
    ) -> Self {
        let history = Arc::new(HistoryLog::new(history_file));
        let session = WorkoutSession::new(
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
            Arc::clone(&history),
            Arc::new(wake_lock),
        );
        info!("History stored at {}", history.path().display());

        Self {
            session,
            history,
            notifier,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Remember the most recent control action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|guard| guard.clone()) {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    /// Server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }
}
