use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::CompletionRecord;
use crate::timer::PendingCompletion;
use crate::validation::ValidationError;

/// Discrete notifications emitted by the controller.
///
/// A presentation layer decides how to surface them (toast, sound, badge);
/// the core never renders anything itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimekeeperEvent {
    /// Meetings and templates were (re)loaded
    DataLoaded {
        meetings: usize,
        templates: usize,
        degraded: bool,
    },

    /// A scheduled meeting's start time has arrived
    MeetingAlert {
        meeting_id: String,
        title: String,
        date_time: DateTime<Utc>,
    },

    TimerStarted {
        meeting_id: String,
        total_duration_seconds: u64,
    },

    /// Remaining time crossed one of the warning thresholds
    TimerWarning {
        meeting_id: String,
        threshold_seconds: u64,
    },

    TimerPaused {
        meeting_id: String,
        remaining_seconds: u64,
    },

    TimerResumed {
        meeting_id: String,
        remaining_seconds: u64,
    },

    TimerStopped {
        meeting_id: String,
        pending: PendingCompletion,
    },

    /// Countdown reached zero
    TimerCompleted {
        meeting_id: String,
        pending: PendingCompletion,
    },

    TimerSnoozed {
        meeting_id: String,
        extra_seconds: u64,
        total_duration_seconds: u64,
    },

    MeetingFinished {
        record: CompletionRecord,
    },

    ValidationError {
        error: ValidationError,
    },

    /// A best-effort write did not reach storage
    PersistenceFailed {
        operation: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let event = TimekeeperEvent::TimerWarning {
            meeting_id: "meeting_1".to_string(),
            threshold_seconds: 60,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timer_warning");
        assert_eq!(json["threshold_seconds"], 60);

        let back: TimekeeperEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
