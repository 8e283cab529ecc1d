use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input rejected before any state was touched
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Meeting title must not be empty")]
    EmptyTitle,

    #[error("Meeting must be scheduled in the future")]
    PastOrInvalidDate,

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_kind() {
        let json = serde_json::to_value(ValidationError::EmptyTitle).unwrap();
        assert_eq!(json["kind"], "empty_title");

        let json =
            serde_json::to_value(ValidationError::MissingRequiredField("name".into())).unwrap();
        assert_eq!(json["kind"], "missing_required_field");
        assert_eq!(json["field"], "name");
    }
}
