use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use timekeeper_types::agenda::total_minutes;
use timekeeper_types::{AgendaItem, EngineConfig, Meeting, MeetingStatus, ValidationError};

use crate::agenda::{parse_agenda_items, FALLBACK_ITEM_TITLE};
use crate::catalog::TemplateCatalog;
use crate::error::{EngineError, Result};

/// Formats accepted for a date-time without an offset, read as local time
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Input of a schedule intent, as typed by the user
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    pub title: String,
    pub date_time: String,
    pub template_id: Option<String>,
    pub agenda_text: Option<String>,
}

impl ScheduleRequest {
    pub fn new(title: impl Into<String>, date_time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date_time: date_time.into(),
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_agenda(mut self, agenda_text: impl Into<String>) -> Self {
        self.agenda_text = Some(agenda_text.into());
        self
    }
}

/// Parse a user-supplied timestamp.
///
/// RFC 3339 is taken as is; `YYYY-MM-DDTHH:MM[:SS]` without an offset is
/// interpreted in the local time zone.
pub fn parse_date_time(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(input, format).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    })
}

/// Validate a schedule request and build the meeting it describes.
///
/// Nothing is stored here; the caller decides when the meeting becomes part
/// of the collection.
pub fn schedule(
    request: &ScheduleRequest,
    catalog: &TemplateCatalog,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> std::result::Result<Meeting, ValidationError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let date_time = parse_date_time(&request.date_time)
        .filter(|date_time| *date_time > now)
        .ok_or(ValidationError::PastOrInvalidDate)?;

    let template_id = request
        .template_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let agenda_text = request
        .agenda_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    let default_minutes = config.default_meeting_minutes;
    let (agenda, total_duration) = match (template_id.and_then(|id| catalog.get(id)), agenda_text) {
        (Some(template), _) => (template.agenda.clone(), template.total_duration),
        (None, Some(text)) => {
            // Parsed against the default target; the stored total is whatever the items add up to
            let agenda = parse_agenda_items(text, default_minutes);
            let total = total_minutes(&agenda);
            (agenda, total)
        }
        (None, None) => (
            vec![AgendaItem::new(FALLBACK_ITEM_TITLE, default_minutes)],
            default_minutes,
        ),
    };

    Ok(Meeting {
        id: new_meeting_id(),
        title: title.to_string(),
        date_time,
        template_id: template_id.map(str::to_string),
        status: MeetingStatus::Scheduled,
        agenda,
        total_duration,
        created_at: now,
        actual_start_time: None,
    })
}

/// Build an immediately-active meeting from a template, skipping date validation
pub fn use_template_meeting(
    catalog: &TemplateCatalog,
    template_id: &str,
    now: DateTime<Utc>,
) -> Result<Meeting> {
    let template = catalog
        .get(template_id)
        .ok_or_else(|| EngineError::TemplateNotFound(template_id.to_string()))?;

    Ok(Meeting {
        id: new_meeting_id(),
        title: template.name.clone(),
        date_time: now,
        template_id: Some(template.id.clone()),
        status: MeetingStatus::Active,
        agenda: template.agenda.clone(),
        total_duration: template.total_duration,
        created_at: now,
        actual_start_time: None,
    })
}

fn new_meeting_id() -> String {
    format!("meeting_{}", uuid::Uuid::new_v4().simple())
}
