pub mod agenda;
pub mod analytics;
pub mod builder;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod scheduler;
pub mod timer;

pub use agenda::parse_agenda_items;
pub use analytics::{compute_kpis, efficiency, record_completion};
pub use builder::TimekeeperBuilder;
pub use catalog::{default_templates, TemplateCatalog};
pub use controller::{EventSender, Timekeeper};
pub use error::{EngineError, Result};
pub use scheduler::{parse_date_time, schedule, use_template_meeting, ScheduleRequest};
pub use timer::{FinishedSession, Ticker, TimerEngine};
