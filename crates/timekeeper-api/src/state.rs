use std::sync::Arc;
use timekeeper_persist::PersistenceClient;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PersistenceClient>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PersistenceClient>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
