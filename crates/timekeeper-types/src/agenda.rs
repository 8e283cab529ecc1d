use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of a meeting agenda.
///
/// Agendas are ordered; the order of items is both the presentation order and
/// the order in which they are run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgendaItem {
    pub title: String,
    /// Allocated minutes
    pub duration: u32,
}

impl AgendaItem {
    pub fn new(title: impl Into<String>, duration: u32) -> Self {
        Self {
            title: title.into(),
            duration,
        }
    }
}

/// Sum of the allocated minutes of an agenda
pub fn total_minutes(items: &[AgendaItem]) -> u32 {
    items
        .iter()
        .map(|item| item.duration)
        .fold(0u32, u32::saturating_add)
}

/// Display string of an agenda: item titles joined with ", "
pub fn describe(items: &[AgendaItem]) -> String {
    items
        .iter()
        .map(|item| item.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
