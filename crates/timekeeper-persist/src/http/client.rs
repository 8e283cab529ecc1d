// REST client for the backend API

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use timekeeper_types::{Meeting, Template};

use crate::builder::HttpPersistenceClientBuilder;
use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

const MEETINGS: &str = "meetings";
const TEMPLATES: &str = "templates";

/// Talks to the backend over HTTP (`/meetings`, `/templates` collections)
pub struct HttpPersistenceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpPersistenceClient {
    /// Client with default timeouts
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        HttpPersistenceClientBuilder::new().base_url(base_url).build()
    }

    pub fn builder() -> HttpPersistenceClientBuilder {
        HttpPersistenceClientBuilder::new()
    }

    pub(crate) fn from_parts(http_client: reqwest::Client, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let response = self.http_client.get(self.collection_url(collection)).send().await?;
        let response = check_status(response, collection, "").await?;
        Ok(response.json().await?)
    }

    async fn create<T>(&self, collection: &str, record: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.collection_url(collection))
            .json(record)
            .send()
            .await?;
        let response = check_status(response, collection, "").await?;
        Ok(response.json().await?)
    }

    async fn update<T>(&self, collection: &str, id: &str, patch: &Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .put(self.record_url(collection, id))
            .json(patch)
            .send()
            .await?;
        let response = check_status(response, collection, id).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.record_url(collection, id))
            .send()
            .await?;
        check_status(response, collection, id).await?;
        Ok(())
    }
}

async fn check_status(response: Response, collection: &str, id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(match collection {
            TEMPLATES => PersistError::TemplateNotFound(id.to_string()),
            _ => PersistError::MeetingNotFound(id.to_string()),
        });
    }

    let message = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, collection, id, "Backend rejected request");
    Err(PersistError::UnexpectedStatus {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl PersistenceClient for HttpPersistenceClient {
    async fn list_meetings(&self) -> Result<Vec<Meeting>> {
        self.list(MEETINGS).await
    }

    async fn create_meeting(&self, meeting: Meeting) -> Result<Meeting> {
        self.create(MEETINGS, &meeting).await
    }

    async fn update_meeting(&self, id: &str, patch: Value) -> Result<Meeting> {
        self.update(MEETINGS, id, &patch).await
    }

    async fn delete_meeting(&self, id: &str) -> Result<()> {
        self.delete(MEETINGS, id).await
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        self.list(TEMPLATES).await
    }

    async fn create_template(&self, template: Template) -> Result<Template> {
        self.create(TEMPLATES, &template).await
    }

    async fn update_template(&self, id: &str, patch: Value) -> Result<Template> {
        self.update(TEMPLATES, id, &patch).await
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        self.delete(TEMPLATES, id).await
    }
}
