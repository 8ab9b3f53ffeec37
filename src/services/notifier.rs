//! Notification sinks for announcements and display updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::DisplayUpdate;

use super::Speech;

/// Receiver of the state machine's announcements and display refreshes.
///
/// Calls are fire-and-forget: the session logs an `Err` and moves on.
pub trait NotificationSink: Send + Sync {
    /// Issue a spoken/textual notice, superseding any pending one
    fn announce(&self, text: &str) -> anyhow::Result<()>;

    fn display_update(&self, update: &DisplayUpdate) -> anyhow::Result<()>;
}

/// The announcement currently occupying the single announcement slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub text: String,
    pub issued_at: DateTime<Utc>,
}

/// Sink that keeps the latest announcement and display in watch channels
/// and optionally speaks announcements aloud.
///
/// A watch channel holds one value, so each announcement replaces the
/// previous one.
#[derive(Debug)]
pub struct ChannelNotifier {
    announcement_tx: watch::Sender<Option<Announcement>>,
    display_tx: watch::Sender<Option<DisplayUpdate>>,
    speech: Option<Speech>,
}

impl ChannelNotifier {
    pub fn new(speech: Option<Speech>) -> Self {
        let (announcement_tx, _) = watch::channel(None);
        let (display_tx, _) = watch::channel(None);

        Self {
            announcement_tx,
            display_tx,
            speech,
        }
    }

    pub fn current_announcement(&self) -> Option<Announcement> {
        self.announcement_tx.borrow().clone()
    }

    pub fn latest_display(&self) -> Option<DisplayUpdate> {
        self.display_tx.borrow().clone()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<Option<DisplayUpdate>> {
        self.display_tx.subscribe()
    }
}

impl NotificationSink for ChannelNotifier {
    fn announce(&self, text: &str) -> anyhow::Result<()> {
        info!("Announcement: {}", text);
        // send_replace works without receivers, unlike send
        self.announcement_tx.send_replace(Some(Announcement {
            text: text.to_string(),
            issued_at: Utc::now(),
        }));

        if let Some(speech) = &self.speech {
            speech.speak(text).map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    fn display_update(&self, update: &DisplayUpdate) -> anyhow::Result<()> {
        debug!(
            status = %update.status,
            time_left = %update.time_left,
            round = %update.round,
            exercise = %update.exercise,
            "display update"
        );
        self.display_tx.send_replace(Some(update.clone()));
        Ok(())
    }
}
