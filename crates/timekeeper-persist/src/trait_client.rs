use async_trait::async_trait;
use serde_json::Value;
use timekeeper_types::{Meeting, Template};

use crate::error::Result;

/// Trait for storage of the meetings and templates collections
///
/// Every call may fail with a connectivity or not-found error. `update_*`
/// takes a partial JSON object that is shallow-merged into the stored record.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn list_meetings(&self) -> Result<Vec<Meeting>>;

    async fn create_meeting(&self, meeting: Meeting) -> Result<Meeting>;

    async fn update_meeting(&self, id: &str, patch: Value) -> Result<Meeting>;

    /// Deleting an unknown id is not an error
    async fn delete_meeting(&self, id: &str) -> Result<()>;

    async fn list_templates(&self) -> Result<Vec<Template>>;

    async fn create_template(&self, template: Template) -> Result<Template>;

    async fn update_template(&self, id: &str, patch: Value) -> Result<Template>;

    /// Deleting an unknown id is not an error
    async fn delete_template(&self, id: &str) -> Result<()>;
}
