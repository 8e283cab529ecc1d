use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::agenda::AgendaItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Alerted,
    Active,
    Completed,
}

impl Default for MeetingStatus {
    fn default() -> Self {
        MeetingStatus::Scheduled
    }
}

/// A scheduled (or running) meeting.
///
/// The agenda is a snapshot taken at creation time; later edits to the
/// template it came from do not reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub status: MeetingStatus,
    pub agenda: Vec<AgendaItem>,
    /// Planned length in minutes
    pub total_duration: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<DateTime<Utc>>,
}

impl Meeting {
    /// Scheduled meeting whose start time has arrived
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == MeetingStatus::Scheduled && self.date_time <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn meeting(status: MeetingStatus, date_time: DateTime<Utc>) -> Meeting {
        Meeting {
            id: "meeting_1".to_string(),
            title: "Planning".to_string(),
            date_time,
            template_id: None,
            status,
            agenda: vec![AgendaItem::new("Meeting discussion", 30)],
            total_duration: 30,
            created_at: date_time - Duration::hours(1),
            actual_start_time: None,
        }
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let now = Utc::now();
        let json = serde_json::to_value(meeting(MeetingStatus::Scheduled, now)).unwrap();

        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["totalDuration"], 30);
        assert!(json.get("dateTime").is_some());
        assert!(json["templateId"].is_null());
        assert!(json.get("actualStartTime").is_none());
    }

    #[test]
    fn test_is_due_only_for_scheduled() {
        let now = Utc::now();
        let past = now - Duration::minutes(1);

        assert!(meeting(MeetingStatus::Scheduled, past).is_due(now));
        assert!(!meeting(MeetingStatus::Alerted, past).is_due(now));
        assert!(!meeting(MeetingStatus::Scheduled, now + Duration::minutes(5)).is_due(now));
    }
}
