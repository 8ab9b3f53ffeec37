//! Workout phases and their presentation

use serde::{Deserialize, Serialize};

/// One mutually exclusive stage of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    GetReady,
    Work,
    Rest,
    RoundRest,
    Finished,
}

impl Phase {
    /// True for the phases that count down: GetReady, Work, Rest and RoundRest
    pub fn is_active(self) -> bool {
        matches!(self, Phase::GetReady | Phase::Work | Phase::Rest | Phase::RoundRest)
    }

    /// Spoken text issued when the phase is entered
    pub fn announcement(self) -> Option<&'static str> {
        match self {
            Phase::Idle => None,
            Phase::GetReady => Some("Get ready"),
            Phase::Work => Some("Start"),
            Phase::Rest => Some("Rest"),
            Phase::RoundRest => Some("End of round"),
            Phase::Finished => Some("Congratulations! Workout complete."),
        }
    }

    /// Display color token
    pub fn color(self) -> &'static str {
        match self {
            Phase::Idle => "white",
            Phase::GetReady | Phase::Finished => "green",
            Phase::Work => "#30d158",
            Phase::Rest => "#ff9f0a",
            Phase::RoundRest => "#0a84ff",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::GetReady => "get-ready",
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::RoundRest => "round-rest",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Spoken word for the final seconds of a countdown
pub fn countdown_word(seconds: u32) -> Option<&'static str> {
    match seconds {
        3 => Some("Three"),
        2 => Some("Two"),
        1 => Some("One"),
        _ => None,
    }
}
