use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use timekeeper_types::{AnalyticsLog, Meeting, MeetingStatus, Settings, Template};

/// On-disk layout of a store file.
///
/// The backend only fills `meetings` and `templates`; the local fallback store
/// also keeps the analytics log and settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub analytics: AnalyticsLog,
    #[serde(default)]
    pub settings: Settings,
}

/// Records stored in a collection keyed by `id`
pub trait Record {
    fn id(&self) -> &str;
}

impl Record for Meeting {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Template {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial meeting update sent on status transitions
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MeetingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<DateTime<Utc>>,
}

impl MeetingPatch {
    pub fn status(status: MeetingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn started(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(MeetingStatus::Active),
            actual_start_time: Some(at),
        }
    }

    pub fn to_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
