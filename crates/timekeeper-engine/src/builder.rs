use std::sync::Arc;

use timekeeper_persist::{JsonFileStore, PersistenceClient};
use timekeeper_types::{EngineConfig, TimekeeperEvent};
use tokio::sync::mpsc;

use crate::controller::Timekeeper;
use crate::error::{EngineError, Result};

const DEFAULT_EVENT_BUFFER: usize = 1000;

/// Builder for a [`Timekeeper`] and the receiving end of its event stream
pub struct TimekeeperBuilder {
    client: Option<Arc<dyn PersistenceClient>>,
    local_store: Option<Arc<JsonFileStore>>,
    config: EngineConfig,
    event_buffer: usize,
}

impl TimekeeperBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            local_store: None,
            config: EngineConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Primary storage for meetings and templates (usually the backend)
    pub fn client(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Local store for analytics, settings and the offline mirror.
    ///
    /// Doubles as primary storage when no client is set.
    pub fn local_store(mut self, store: Arc<JsonFileStore>) -> Self {
        self.local_store = Some(store);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Capacity of the event channel; events beyond it are dropped
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    pub fn build(self) -> Result<(Timekeeper, mpsc::Receiver<TimekeeperEvent>)> {
        let client: Arc<dyn PersistenceClient> = match (self.client, &self.local_store) {
            (Some(client), _) => client,
            (None, Some(local)) => local.clone(),
            (None, None) => {
                return Err(EngineError::Configuration(
                    "a persistence client or a local store is required".to_string(),
                ))
            }
        };

        validate_intervals(&self.config)?;

        let (tx, rx) = mpsc::channel(self.event_buffer);
        let timekeeper = Timekeeper::new(client, self.local_store, self.config, tx);

        Ok((timekeeper, rx))
    }
}

/// tokio intervals panic on a zero period
fn validate_intervals(config: &EngineConfig) -> Result<()> {
    let intervals = [
        ("tick_interval", config.tick_interval),
        ("alert_check_interval", config.alert_check_interval),
        ("autosave_interval", config.autosave_interval),
    ];
    match intervals.iter().find(|(_, period)| period.is_zero()) {
        Some((name, _)) => Err(EngineError::Configuration(format!(
            "{name} must be greater than zero"
        ))),
        None => Ok(()),
    }
}

impl Default for TimekeeperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
