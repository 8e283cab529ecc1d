use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{PersistError, Result};

/// Shallow-merge a JSON object into a record (`{...record, ...patch}`).
///
/// The record keeps its `id` even if the patch carries another one. The
/// merged value must still deserialize into `T`.
pub fn apply_patch<T>(record: &T, patch: &Value) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let patch_fields = patch
        .as_object()
        .ok_or_else(|| PersistError::InvalidPatch("patch must be a JSON object".to_string()))?;

    let mut merged = serde_json::to_value(record)?;
    let fields = merged
        .as_object_mut()
        .ok_or_else(|| PersistError::Internal("record is not a JSON object".to_string()))?;

    let id = fields.get("id").cloned();
    for (key, value) in patch_fields {
        fields.insert(key.clone(), value.clone());
    }
    if let Some(id) = id {
        fields.insert("id".to_string(), id);
    }

    serde_json::from_value(merged).map_err(|e| PersistError::InvalidPatch(e.to_string()))
}
