use std::time::Duration;

use crate::error::{PersistError, Result};
use crate::http::client::HttpPersistenceClient;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

pub struct HttpPersistenceClientBuilder {
    base_url: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl HttpPersistenceClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
        }
    }

    /// Base URL of the API, e.g. `http://localhost:3000/api`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpPersistenceClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(PersistError::Internal("base_url is required".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(HttpPersistenceClient::from_parts(http_client, base_url))
    }
}

impl Default for HttpPersistenceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
