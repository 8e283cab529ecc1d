use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Unexpected response status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PersistError::MeetingNotFound(_) | PersistError::TemplateNotFound(_)
        )
    }

    /// Backend unreachable or too slow, as opposed to a rejected request
    pub fn is_connectivity(&self) -> bool {
        match self {
            PersistError::Connection(_) => true,
            PersistError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
