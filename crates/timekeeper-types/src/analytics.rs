use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one finished meeting. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub meeting_id: String,
    pub title: String,
    /// Minutes
    pub planned_duration: u32,
    /// Minutes, rounded up from elapsed seconds
    pub actual_duration: u32,
    /// Percent, `planned / actual * 100` rounded; above 100 means it ended early
    pub efficiency: u32,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl CompletionRecord {
    pub fn on_time(&self) -> bool {
        self.efficiency >= 100
    }
}

/// Completion log plus the running total of meeting minutes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsLog {
    #[serde(default)]
    pub completed_meetings: Vec<CompletionRecord>,
    #[serde(default)]
    pub total_time: u64,
}

/// Aggregate figures derived from the completion log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_meetings: usize,
    pub avg_efficiency: u32,
    pub time_saved_minutes: u64,
    pub on_time_rate_percent: u32,
}
