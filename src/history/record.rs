//! A finished workout

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::utils::format_minutes_seconds;

/// Local date and time as stored in the `date` field
pub const DATE_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";

/// One persisted workout. Never mutated once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    /// Seconds, lead-in included
    pub duration: u64,
    pub rounds: u32,
    pub exercises: u32,
}

impl HistoryRecord {
    pub fn new(finished_at: DateTime<Local>, duration: u64, rounds: u32, exercises: u32) -> Self {
        Self {
            date: finished_at.format(DATE_FORMAT).to_string(),
            duration,
            rounds,
            exercises,
        }
    }

    /// Record stamped with the current local time
    pub fn now(duration: u64, rounds: u32, exercises: u32) -> Self {
        Self::new(Local::now(), duration, rounds, exercises)
    }

    /// History view line, e.g. `4 Rounds • 3m 5s`
    pub fn summary(&self) -> String {
        format!("{} Rounds • {}", self.rounds, format_minutes_seconds(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_date_and_summary() {
        let finished_at = Local.with_ymd_and_hms(2024, 3, 7, 18, 4, 9).unwrap();
        let record = HistoryRecord::new(finished_at, 165, 2, 2);

        assert_eq!(record.date, "3/7/2024 6:04:09 PM");
        assert_eq!(record.summary(), "2 Rounds • 2m 45s");
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let record = HistoryRecord {
            date: "1/2/2024 9:00:00 AM".to_string(),
            duration: 61,
            rounds: 4,
            exercises: 8,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "1/2/2024 9:00:00 AM",
                "duration": 61,
                "rounds": 4,
                "exercises": 8
            })
        );
    }
}
