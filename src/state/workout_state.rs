//! Workout state snapshot

use serde::{Deserialize, Serialize};

use super::Phase;

/// Counters and countdown for the current workout.
///
/// Owned by [`PhaseMachine`](super::PhaseMachine); everything outside the
/// machine only ever sees clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutState {
    pub phase: Phase,
    pub time_left_seconds: u32,
    /// 1-based, never exceeds the configured round count
    pub current_round: u32,
    /// 1-based, never exceeds the configured exercises per round
    pub current_exercise: u32,
    /// Seconds counted down since start, lead-in included
    pub elapsed_seconds: u64,
    pub paused: bool,
}

impl WorkoutState {
    /// A state with no workout loaded
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            time_left_seconds: 0,
            current_round: 1,
            current_exercise: 1,
            elapsed_seconds: 0,
            paused: false,
        }
    }

    /// Whether a workout is counting down (paused or not)
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Label for the pause/resume control
    pub fn control_label(&self) -> &'static str {
        if self.paused { "Resume" } else { "Pause" }
    }
}

impl Default for WorkoutState {
    fn default() -> Self {
        Self::idle()
    }
}
