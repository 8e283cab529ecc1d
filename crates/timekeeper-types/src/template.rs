use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::agenda::AgendaItem;

/// Reusable agenda definition.
///
/// `total_duration` is stored as `duration` on the wire, matching the records
/// the backend already holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub total_duration: u32,
    #[serde(default)]
    pub description: String,
    pub agenda: Vec<AgendaItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
