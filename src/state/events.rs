//! Events emitted by the phase state machine

use serde::{Deserialize, Serialize};

use super::{phase::countdown_word, Phase};

/// Everything a display needs to render the current moment of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayUpdate {
    pub status: String,
    pub color: String,
    /// `r/R`
    pub round: String,
    /// `e/E`
    pub exercise: String,
    /// `MM:SS`
    pub time_left: String,
    pub next_label: String,
}

/// Output of the state machine, consumed by notification sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkoutEvent {
    /// Countdown decremented without changing phase
    Tick { display: DisplayUpdate },
    /// One of the last three seconds of a phase
    Countdown { seconds: u32 },
    /// Remaining work time reached half the configured work duration
    Halfway,
    PhaseEntered { phase: Phase, display: DisplayUpdate },
    #[serde(rename_all = "camelCase")]
    WorkoutCompleted {
        elapsed_seconds: u64,
        rounds: u32,
        exercises_per_round: u32,
    },
    Paused,
    Resumed,
}

impl WorkoutEvent {
    /// Text to announce for this event, if any
    pub fn announcement(&self) -> Option<&'static str> {
        match self {
            WorkoutEvent::Countdown { seconds } => countdown_word(*seconds),
            WorkoutEvent::Halfway => Some("Halfway there"),
            WorkoutEvent::PhaseEntered { phase, .. } => phase.announcement(),
            WorkoutEvent::Paused => Some("Paused"),
            WorkoutEvent::Resumed => Some("Resuming"),
            WorkoutEvent::Tick { .. } | WorkoutEvent::WorkoutCompleted { .. } => None,
        }
    }

    /// Display refresh carried by this event, if any
    pub fn display(&self) -> Option<&DisplayUpdate> {
        match self {
            WorkoutEvent::Tick { display } | WorkoutEvent::PhaseEntered { display, .. } => {
                Some(display)
            }
            _ => None,
        }
    }
}
