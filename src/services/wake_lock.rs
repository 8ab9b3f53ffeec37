//! Keeps the machine awake while a workout runs

use std::{process::Stdio, sync::Mutex};

use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Holds a `systemd-inhibit` child process for the duration of a workout.
///
/// When disabled every call is a no-op.
#[derive(Debug)]
pub struct WakeLock {
    enabled: bool,
    inhibitor: Mutex<Option<Child>>,
}

impl WakeLock {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            inhibitor: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Whether an inhibitor process is currently held
    pub fn is_held(&self) -> bool {
        self.inhibitor
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Take the inhibitor lock. Acquiring twice keeps the existing lock.
    /// Must be called from within a tokio runtime.
    pub fn acquire(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        let mut inhibitor = self
            .inhibitor
            .lock()
            .map_err(|e| format!("Failed to lock wake lock state: {}", e))?;
        if inhibitor.is_some() {
            debug!("Wake lock already held");
            return Ok(());
        }

        let child = Command::new("systemd-inhibit")
            .args([
                "--what=idle:sleep",
                "--who=hiit-timer",
                "--why=Workout in progress",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("Failed to execute systemd-inhibit: {}", e))?;

        *inhibitor = Some(child);
        info!("Wake lock acquired");
        Ok(())
    }

    /// Drop the inhibitor lock if held
    pub fn release(&self) -> Result<(), String> {
        let mut inhibitor = self
            .inhibitor
            .lock()
            .map_err(|e| format!("Failed to lock wake lock state: {}", e))?;

        if let Some(mut child) = inhibitor.take() {
            child
                .start_kill()
                .map_err(|e| format!("Failed to stop systemd-inhibit: {}", e))?;
            info!("Wake lock released");
        }
        Ok(())
    }
}
