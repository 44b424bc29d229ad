use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::error;

pub const RECORDS_KEY: &str = "juggle-records";
pub const BIN_ID_KEY: &str = "juggle-bin-id";

/// String key-value entries scoped to this device, kept in one JSON file.
#[derive(Debug)]
pub struct DeviceStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DeviceStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        read_entries(&self.path).await.remove(key)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), std::io::Error> {
        let _guard = self.write_lock.lock().await;
        let mut entries = read_entries(&self.path).await;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, payload).await
    }
}

async fn read_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse device storage {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read device storage {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get(RECORDS_KEY).await, None);
    }

    #[tokio::test]
    async fn set_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path().join("nested/device.json"));
        storage.set(BIN_ID_KEY, "bin-1").await.unwrap();
        storage.set(RECORDS_KEY, "{}").await.unwrap();
        storage.set(BIN_ID_KEY, "bin-2").await.unwrap();
        assert_eq!(storage.get(BIN_ID_KEY).await.as_deref(), Some("bin-2"));
        assert_eq!(storage.get(RECORDS_KEY).await.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = DeviceStorage::new(&path);
        assert_eq!(storage.get(BIN_ID_KEY).await, None);
    }
}
