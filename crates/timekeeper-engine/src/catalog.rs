use chrono::{DateTime, Utc};
use timekeeper_types::agenda::describe;
use timekeeper_types::{AgendaItem, Template, ValidationError};

use crate::agenda::parse_agenda_items;
use crate::error::{EngineError, Result};

/// Named, reusable agendas.
///
/// Order is insertion order. An empty catalog is seeded with
/// [`default_templates`] when it is first built.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Catalog holding only the built-in templates
    pub fn new() -> Self {
        Self::from_templates(Vec::new())
    }

    /// Catalog over loaded templates, seeded with the defaults if there are none
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let mut catalog = Self { templates };
        if catalog.templates.is_empty() {
            tracing::info!("No templates found, using default templates");
            catalog.templates = default_templates(Utc::now());
        }
        catalog
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Validate input and build a new template without adding it
    pub fn build(
        name: &str,
        total_duration: u32,
        agenda_text: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Template, ValidationError> {
        let (name, agenda) = validate(name, total_duration, agenda_text)?;

        Ok(Template {
            id: format!("template_{}", uuid::Uuid::new_v4().simple()),
            name,
            total_duration,
            description: describe(&agenda),
            agenda,
            created_at: now,
            updated_at: None,
        })
    }

    /// Build the edited version of an existing template without storing it.
    ///
    /// Keeps `id` and `created_at`, re-parses the agenda, sets `updated_at`.
    pub fn prepare_update(
        &self,
        id: &str,
        name: &str,
        total_duration: u32,
        agenda_text: &str,
        now: DateTime<Utc>,
    ) -> Result<Template> {
        let existing = self
            .get(id)
            .ok_or_else(|| EngineError::TemplateNotFound(id.to_string()))?;
        let (name, agenda) = validate(name, total_duration, agenda_text)?;

        Ok(Template {
            id: existing.id.clone(),
            name,
            total_duration,
            description: describe(&agenda),
            agenda,
            created_at: existing.created_at,
            updated_at: Some(now),
        })
    }

    pub fn create(
        &mut self,
        name: &str,
        total_duration: u32,
        agenda_text: &str,
    ) -> Result<Template> {
        let template = Self::build(name, total_duration, agenda_text, Utc::now())?;
        self.insert(template.clone());
        Ok(template)
    }

    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        total_duration: u32,
        agenda_text: &str,
    ) -> Result<Template> {
        let template = self.prepare_update(id, name, total_duration, agenda_text, Utc::now())?;
        self.insert(template.clone());
        Ok(template)
    }

    /// Add a template, replacing any with the same id in place
    pub fn insert(&mut self, template: Template) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    /// Returns whether a template was removed
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        self.templates.len() != before
    }
}

fn validate(
    name: &str,
    total_duration: u32,
    agenda_text: &str,
) -> std::result::Result<(String, Vec<AgendaItem>), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingRequiredField("name".to_string()));
    }
    if total_duration == 0 {
        return Err(ValidationError::MissingRequiredField("duration".to_string()));
    }
    let agenda_text = agenda_text.trim();
    if agenda_text.is_empty() {
        return Err(ValidationError::MissingRequiredField("agenda".to_string()));
    }

    Ok((name.to_string(), parse_agenda_items(agenda_text, total_duration)))
}

/// Built-in templates offered when nothing else is stored
pub fn default_templates(now: DateTime<Utc>) -> Vec<Template> {
    let seed = |id: &str, name: &str, total_duration: u32, agenda: Vec<AgendaItem>| Template {
        id: id.to_string(),
        name: name.to_string(),
        total_duration,
        description: describe(&agenda),
        agenda,
        created_at: now,
        updated_at: None,
    };

    vec![
        seed(
            "template_daily_standup",
            "Daily Standup",
            15,
            vec![
                AgendaItem::new("Check-in", 2),
                AgendaItem::new("Yesterday's progress", 5),
                AgendaItem::new("Today's plan", 5),
                AgendaItem::new("Blockers", 3),
            ],
        ),
        seed(
            "template_client_review",
            "Client Review",
            45,
            vec![
                AgendaItem::new("Welcome and agenda", 5),
                AgendaItem::new("Progress review", 15),
                AgendaItem::new("Feedback discussion", 15),
                AgendaItem::new("Next steps", 10),
            ],
        ),
        seed(
            "template_brainstorming",
            "Brainstorming",
            60,
            vec![
                AgendaItem::new("Problem framing", 10),
                AgendaItem::new("Idea generation", 25),
                AgendaItem::new("Discussion and voting", 15),
                AgendaItem::new("Action items", 10),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use timekeeper_types::agenda::total_minutes;

    #[test]
    fn test_empty_catalog_is_seeded() {
        let catalog = TemplateCatalog::new();
        let names: Vec<&str> = catalog.list().iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["Daily Standup", "Client Review", "Brainstorming"]);
        for template in catalog.list() {
            assert_eq!(template.agenda.len(), 4);
            assert!(total_minutes(&template.agenda) <= template.total_duration);
        }
        assert_eq!(catalog.get("template_daily_standup").unwrap().total_duration, 15);
    }

    #[test]
    fn test_loaded_templates_are_not_reseeded() {
        let mut catalog = TemplateCatalog::new();
        let custom = catalog.create("Retro", 30, "Went well\nTo improve").unwrap();

        let reloaded = TemplateCatalog::from_templates(vec![custom.clone()]);
        assert_eq!(reloaded.list(), &[custom]);
    }

    #[test]
    fn test_create_parses_agenda_and_describes_it() {
        let mut catalog = TemplateCatalog::new();
        let template = catalog
            .create("  1:1  ", 30, "Updates (10 min)\nCareer\nFeedback")
            .unwrap();

        assert!(template.id.starts_with("template_"));
        assert_eq!(template.name, "1:1");
        assert_eq!(template.description, "Updates, Career, Feedback");
        assert_eq!(
            template.agenda,
            vec![
                AgendaItem::new("Updates", 10),
                AgendaItem::new("Career", 10),
                AgendaItem::new("Feedback", 10),
            ]
        );
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.list().last(), Some(&template));
    }

    #[test]
    fn test_create_requires_all_fields() {
        let mut catalog = TemplateCatalog::new();

        let err = catalog.create(" ", 30, "A").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MissingRequiredField(ref f)) if f == "name"
        ));
        let err = catalog.create("Sync", 0, "A").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MissingRequiredField(ref f)) if f == "duration"
        ));
        let err = catalog.create("Sync", 30, "\n \n").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::MissingRequiredField(ref f)) if f == "agenda"
        ));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_update_keeps_identity_and_replaces_content() {
        let mut catalog = TemplateCatalog::new();
        let original = catalog.get("template_client_review").unwrap().clone();

        let updated = catalog
            .update("template_client_review", "Client Sync", 30, "Status\nRisks")
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.name, "Client Sync");
        assert_eq!(updated.total_duration, 30);
        assert_eq!(updated.description, "Status, Risks");
        assert_eq!(catalog.get("template_client_review"), Some(&updated));
        // position is preserved
        assert_eq!(catalog.list()[1].id, "template_client_review");
    }

    #[test]
    fn test_update_unknown_template() {
        let mut catalog = TemplateCatalog::new();
        let err = catalog.update("nope", "x", 10, "A").unwrap_err();
        assert!(matches!(err, EngineError::TemplateNotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_delete() {
        let mut catalog = TemplateCatalog::new();

        assert!(catalog.delete("template_brainstorming"));
        assert!(!catalog.delete("template_brainstorming"));
        assert_eq!(catalog.len(), 2);
    }
}
