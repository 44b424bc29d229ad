use crate::models::RecordsDocument;
use crate::remote::BinClientError;
use crate::storage::{DeviceStorage, RECORDS_KEY};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("device storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("remote bin error: {0}")]
    Remote(#[from] BinClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing to write to, e.g. a remote adapter that never got a bin.
    Skipped,
}

/// Load and save of the whole record collection.
#[async_trait]
pub trait RecordPersistence: Send + Sync + 'static {
    async fn load(&self) -> Result<RecordsDocument, PersistenceError>;

    async fn save(&self, document: &RecordsDocument) -> Result<SaveOutcome, PersistenceError>;

    fn describe(&self) -> &'static str;
}

/// Records kept under a fixed key in device storage.
pub struct LocalPersistence {
    storage: Arc<DeviceStorage>,
}

impl LocalPersistence {
    pub fn new(storage: Arc<DeviceStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl RecordPersistence for LocalPersistence {
    /// Absent or unparsable data loads as an empty collection.
    async fn load(&self) -> Result<RecordsDocument, PersistenceError> {
        let Some(raw) = self.storage.get(RECORDS_KEY).await else {
            return Ok(RecordsDocument::default());
        };

        match serde_json::from_str(&raw) {
            Ok(document) => Ok(document),
            Err(err) => {
                warn!("discarding unparsable stored records: {err}");
                Ok(RecordsDocument::default())
            }
        }
    }

    async fn save(&self, document: &RecordsDocument) -> Result<SaveOutcome, PersistenceError> {
        let payload = serde_json::to_string(document)?;
        self.storage.set(RECORDS_KEY, &payload).await?;
        Ok(SaveOutcome::Saved)
    }

    fn describe(&self) -> &'static str {
        "local"
    }
}
