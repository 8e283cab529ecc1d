pub mod agenda;
pub mod analytics;
pub mod config;
pub mod events;
pub mod meeting;
pub mod settings;
pub mod template;
pub mod timer;
pub mod validation;

pub use agenda::AgendaItem;
pub use analytics::{AnalyticsLog, CompletionRecord, Kpis};
pub use config::EngineConfig;
pub use events::TimekeeperEvent;
pub use meeting::{Meeting, MeetingStatus};
pub use settings::{Settings, Theme};
pub use template::Template;
pub use timer::{CompletionReason, PendingCompletion, TimerPhase, TimerSession, TimerSnapshot};
pub use validation::ValidationError;
