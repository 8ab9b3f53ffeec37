//! File-backed history storage

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use super::HistoryRecord;

/// Default storage key: the history file name
pub const HISTORY_FILE: &str = "hiit_history.json";

/// Append-only, newest-first log of finished workouts.
///
/// Each write rewrites the whole array. Writers are serialized in-process;
/// across processes the last write wins.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Log stored under the default file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records, newest first. Missing or unreadable storage yields
    /// an empty list.
    pub fn list(&self) -> Vec<HistoryRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history file yet");
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                warn!("Ignoring malformed history {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Put `entry` at the front of the log and persist the full sequence
    pub fn record(&self, entry: HistoryRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow!("history write lock poisoned: {}", e))?;

        let mut records = self.list();
        records.insert(0, entry);

        let contents = serde_json::to_string(&records).context("serialize history")?;
        write_atomic(&self.path, &contents)?;
        info!(path = %self.path.display(), count = records.len(), "history saved");
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp history {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace history {}", path.display()))?;
    Ok(())
}
