use thiserror::Error;
use timekeeper_persist::PersistError;
use timekeeper_types::{TimerPhase, ValidationError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No active timer session")]
    NoActiveSession,

    #[error("A timer session is already active for meeting {0}")]
    SessionAlreadyActive(String),

    #[error("Cannot {action} while timer is {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: TimerPhase,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::MeetingNotFound(_) | EngineError::TemplateNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
