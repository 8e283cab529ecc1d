use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use timekeeper_types::{AnalyticsLog, Meeting, Settings, Template};
use tokio::sync::Mutex;

use crate::error::{PersistError, Result};
use crate::merge::apply_patch;
use crate::models::{Record, StoreData};
use crate::trait_client::PersistenceClient;

/// Single-file JSON store.
///
/// Every operation re-reads the file, applies its change and writes the whole
/// document back (last write wins). Writes go through a temporary file and a
/// rename so a crash never leaves a truncated document behind.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store, creating the file with empty collections if it is missing
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if !tokio::fs::try_exists(&store.path).await? {
            tracing::info!(path = %store.path.display(), "Initializing empty store file");
            store.write(&StoreData::default()).await?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<StoreData> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(StoreData::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreData::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, data: &StoreData) -> Result<()> {
        let contents = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Read-modify-write under the store lock
    async fn mutate<R>(&self, change: impl FnOnce(&mut StoreData) -> Result<R>) -> Result<R> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.read().await?;
        let result = change(&mut data)?;
        self.write(&data).await?;
        Ok(result)
    }

    pub async fn load_analytics(&self) -> Result<AnalyticsLog> {
        Ok(self.read().await?.analytics)
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        Ok(self.read().await?.settings)
    }

    /// Overwrite every section at once
    pub async fn save_all(&self, data: StoreData) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(&data).await
    }
}

fn upsert<T: Record>(records: &mut Vec<T>, record: T) {
    match records.iter_mut().find(|existing| existing.id() == record.id()) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

fn patch_record<T>(records: &mut [T], id: &str, patch: &Value) -> Result<Option<T>>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    let Some(existing) = records.iter_mut().find(|existing| existing.id() == id) else {
        return Ok(None);
    };
    *existing = apply_patch(existing, patch)?;
    Ok(Some(existing.clone()))
}

fn remove<T: Record>(records: &mut Vec<T>, id: &str) {
    records.retain(|record| record.id() != id);
}

#[async_trait]
impl PersistenceClient for JsonFileStore {
    async fn list_meetings(&self) -> Result<Vec<Meeting>> {
        Ok(self.read().await?.meetings)
    }

    async fn create_meeting(&self, meeting: Meeting) -> Result<Meeting> {
        self.mutate(|data| {
            upsert(&mut data.meetings, meeting.clone());
            Ok(meeting)
        })
        .await
    }

    async fn update_meeting(&self, id: &str, patch: Value) -> Result<Meeting> {
        self.mutate(|data| {
            patch_record(&mut data.meetings, id, &patch)?
                .ok_or_else(|| PersistError::MeetingNotFound(id.to_string()))
        })
        .await
    }

    async fn delete_meeting(&self, id: &str) -> Result<()> {
        self.mutate(|data| {
            remove(&mut data.meetings, id);
            Ok(())
        })
        .await
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        Ok(self.read().await?.templates)
    }

    async fn create_template(&self, template: Template) -> Result<Template> {
        self.mutate(|data| {
            upsert(&mut data.templates, template.clone());
            Ok(template)
        })
        .await
    }

    async fn update_template(&self, id: &str, patch: Value) -> Result<Template> {
        self.mutate(|data| {
            patch_record(&mut data.templates, id, &patch)?
                .ok_or_else(|| PersistError::TemplateNotFound(id.to_string()))
        })
        .await
    }

    async fn delete_template(&self, id: &str) -> Result<()> {
        self.mutate(|data| {
            remove(&mut data.templates, id);
            Ok(())
        })
        .await
    }
}
