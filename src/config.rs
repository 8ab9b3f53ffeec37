//! Configuration: CLI arguments for the service and the per-workout settings

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::WorkoutError;

/// Length of the lead-in countdown before the first work phase
pub const GET_READY_SECONDS: u32 = 5;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "hiit-timer")]
#[command(about = "An interval-workout timer service with spoken announcements")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the workout history log
    #[arg(long, default_value = "hiit_history.json")]
    pub history_file: PathBuf,

    /// Command used to speak announcements, e.g. "spd-say" or "espeak -v en-us"
    #[arg(long)]
    pub speech_command: Option<String>,

    /// Hold a systemd-inhibit lock while a workout is running
    #[arg(long)]
    pub inhibit_sleep: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// User-chosen counts and durations for one workout.
///
/// Captured by value when a workout starts and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutConfig {
    pub exercises_per_round: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
    pub round_rest_seconds: u32,
}

impl WorkoutConfig {
    /// Build and validate a configuration
    pub fn new(
        exercises_per_round: u32,
        work_seconds: u32,
        rest_seconds: u32,
        rounds: u32,
        round_rest_seconds: u32,
    ) -> Result<Self, WorkoutError> {
        let config = Self {
            exercises_per_round,
            work_seconds,
            rest_seconds,
            rounds,
            round_rest_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON object.
    ///
    /// Accepts the long field names as well as the short form-field names
    /// (`exercises`, `work`, `rest`, `roundRest`). Values may be integers or
    /// numeric strings.
    pub fn from_json(value: &Value) -> Result<Self, WorkoutError> {
        let object = value
            .as_object()
            .ok_or_else(|| WorkoutError::invalid("body", "must be a JSON object"))?;

        Self::new(
            read_field(object, "exercisesPerRound", &["exercises"])?,
            read_field(object, "workSeconds", &["work"])?,
            read_field(object, "restSeconds", &["rest"])?,
            read_field(object, "rounds", &[])?,
            read_field(object, "roundRestSeconds", &["roundRest"])?,
        )
    }

    /// Check field ranges. Rest and round rest may be zero; everything else
    /// must be positive.
    pub fn validate(&self) -> Result<(), WorkoutError> {
        if self.exercises_per_round == 0 {
            return Err(WorkoutError::invalid("exercisesPerRound", "must be greater than zero"));
        }
        if self.work_seconds == 0 {
            return Err(WorkoutError::invalid("workSeconds", "must be greater than zero"));
        }
        if self.rounds == 0 {
            return Err(WorkoutError::invalid("rounds", "must be greater than zero"));
        }
        if self.checked_total_seconds().is_none() {
            return Err(WorkoutError::invalid("rounds", "makes the workout too long"));
        }
        Ok(())
    }

    /// Seconds from start to finish, lead-in included
    pub fn total_seconds(&self) -> u64 {
        self.checked_total_seconds().unwrap_or(u64::MAX)
    }

    fn checked_total_seconds(&self) -> Option<u64> {
        let rounds = u64::from(self.rounds);
        let exercises = u64::from(self.exercises_per_round);

        let work = rounds
            .checked_mul(exercises)?
            .checked_mul(u64::from(self.work_seconds))?;
        let rest = rounds
            .checked_mul(exercises.saturating_sub(1))?
            .checked_mul(u64::from(self.rest_seconds))?;
        let round_rest = rounds
            .saturating_sub(1)
            .checked_mul(u64::from(self.round_rest_seconds))?;

        u64::from(GET_READY_SECONDS)
            .checked_add(work)?
            .checked_add(rest)?
            .checked_add(round_rest)
    }
}

fn read_field(
    object: &Map<String, Value>,
    field: &'static str,
    aliases: &[&str],
) -> Result<u32, WorkoutError> {
    let value = std::iter::once(field)
        .chain(aliases.iter().copied())
        .find_map(|key| object.get(key))
        .filter(|value| !value.is_null())
        .ok_or_else(|| WorkoutError::invalid(field, "is missing"))?;

    let number = match value {
        Value::Number(n) if n.is_f64() => {
            return Err(WorkoutError::invalid(field, "must be a whole number"));
        }
        Value::Number(n) => match n.as_i64() {
            Some(n) => n,
            None => return Err(WorkoutError::invalid(field, "is too large")),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| WorkoutError::invalid(field, format!("is not a number: {:?}", s)))?,
        _ => return Err(WorkoutError::invalid(field, "is not a number")),
    };

    if number < 0 {
        return Err(WorkoutError::invalid(field, "must not be negative"));
    }
    u32::try_from(number).map_err(|_| WorkoutError::invalid(field, "is too large"))
}
