use serde::{Deserialize, Serialize};

use crate::meeting::Meeting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero; waiting for finish or snooze
    Completed,
    /// Stopped by hand; waiting for finish or snooze
    Stopped,
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Idle
    }
}

impl TimerPhase {
    /// Completed or Stopped: a completion decision is pending
    pub fn awaiting_decision(self) -> bool {
        matches!(self, TimerPhase::Completed | TimerPhase::Stopped)
    }
}

/// Countdown bookkeeping of the active meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub meeting_id: String,
    pub total_duration_seconds: u64,
    pub remaining_seconds: u64,
    pub running: bool,
}

impl TimerSession {
    pub fn elapsed_seconds(&self) -> u64 {
        self.total_duration_seconds - self.remaining_seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionReason {
    Expired,
    Stopped,
}

/// Durations computed when the countdown ends, before the run is finalised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCompletion {
    pub reason: CompletionReason,
    /// Minutes
    pub planned_duration: u32,
    /// Minutes
    pub actual_duration: u32,
}

/// Read-only view of the timer for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub session: Option<TimerSession>,
    pub meeting: Option<Meeting>,
    pub pending: Option<PendingCompletion>,
}
