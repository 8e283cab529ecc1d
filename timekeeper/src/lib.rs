//! # Timekeeper
//!
//! Keeps meetings on schedule. Plan a meeting with a timed agenda, run a
//! countdown with warnings before the end, snooze or finish when time is up,
//! and track how closely meetings stick to their plan.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use timekeeper::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = HttpPersistenceClient::new("http://localhost:3000/api")?;
//! let local = JsonFileStore::open("data/timekeeper.json").await?;
//!
//! let (timekeeper, mut events) = TimekeeperBuilder::new()
//!     .client(Arc::new(client))
//!     .local_store(Arc::new(local))
//!     .build()?;
//!
//! timekeeper.load().await;
//!
//! let meeting = timekeeper
//!     .schedule(
//!         ScheduleRequest::new("Sprint planning", "2030-05-01T10:00")
//!             .with_agenda("Review (10 min)\nPlanning (20 min)"),
//!     )
//!     .await?;
//! timekeeper.start(&meeting.id).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let TimekeeperEvent::TimerCompleted { .. } = event {
//!         let record = timekeeper.finish().await?;
//!         println!("Efficiency: {}%", record.efficiency);
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **types**: meetings, templates, agenda items, timer state, analytics records, events
//! - **engine**: agenda parsing, scheduling, the timer state machine and the controller
//! - **persist**: the `PersistenceClient` trait, its HTTP client and the JSON file store
//!
//! The REST backend lives in the `timekeeper-api` binary crate.
//!
//! ## Storage
//!
//! Meetings and templates go through the remote API. When it is unreachable the
//! controller falls back to the local JSON snapshot and keeps working in
//! degraded mode. Analytics and settings are only ever stored locally.

pub use timekeeper_engine as engine;
pub use timekeeper_persist as persist;
pub use timekeeper_types as types;

pub use timekeeper_engine::{
    parse_agenda_items, ScheduleRequest, TemplateCatalog, Timekeeper, TimekeeperBuilder,
    TimerEngine,
};
pub use timekeeper_persist::{HttpPersistenceClient, JsonFileStore, PersistenceClient};
pub use timekeeper_types::{
    AgendaItem, CompletionRecord, EngineConfig, Kpis, Meeting, MeetingStatus, Template,
    TimekeeperEvent, TimerPhase, TimerSnapshot,
};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::engine::{EngineError, ScheduleRequest, Timekeeper, TimekeeperBuilder};
    pub use crate::persist::{HttpPersistenceClient, JsonFileStore, PersistenceClient};
    pub use crate::types::{
        AgendaItem, CompletionRecord, EngineConfig, Kpis, Meeting, MeetingStatus, Template,
        TimekeeperEvent, TimerPhase, TimerSnapshot,
    };
    pub use anyhow::Result;
    pub use std::sync::Arc;
}
