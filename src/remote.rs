use crate::models::{BinId, RecordsDocument};
use crate::persistence::{PersistenceError, RecordPersistence, SaveOutcome};
use crate::storage::{BIN_ID_KEY, DeviceStorage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum BinClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("bin store answered with status {0}")]
    Status(u16),
    #[error("failed to parse bin store response: {0}")]
    Parsing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinCreated {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// HTTP client for a bin store: either the upstream service or a `/api/bins` proxy.
#[derive(Debug, Clone)]
pub struct BinClient {
    http: reqwest::Client,
    base_url: String,
}

impl BinClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn bin_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    pub async fn create(&self, body: &Value) -> Result<BinCreated, BinClientError> {
        let created = self.create_raw(body).await?;
        serde_json::from_value(created).map_err(|e| BinClientError::Parsing(e.to_string()))
    }

    /// Like [`BinClient::create`] but hands back the store's response untouched.
    pub async fn create_raw(&self, body: &Value) -> Result<Value, BinClientError> {
        let request = self.http.post(&self.base_url).json(body);
        self.send(request).await
    }

    pub async fn read(&self, id: &str) -> Result<Value, BinClientError> {
        let request = self.http.get(self.bin_url(id));
        self.send(request).await
    }

    pub async fn replace(&self, id: &str, body: &Value) -> Result<Value, BinClientError> {
        let request = self.http.put(self.bin_url(id)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, BinClientError> {
        let resp = request
            .send()
            .await
            .map_err(|e| BinClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BinClientError::Status(resp.status().as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| BinClientError::Parsing(e.to_string()))
    }
}

/// The bin this process is bound to, if any, and the URL that shares it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinSession {
    pub bin_id: Option<BinId>,
    pub share_url: Option<String>,
}

impl BinSession {
    fn bound(bin_id: BinId, public_url: &str) -> Self {
        let share_url = share_url_for(public_url, &bin_id);
        Self {
            bin_id: Some(bin_id),
            share_url,
        }
    }
}

/// The fragment of `share_url`, e.g. `abc123` in `https://host/#abc123`.
pub fn bin_id_from_share_url(share_url: &str) -> Option<BinId> {
    match Url::parse(share_url) {
        Ok(url) => url.fragment().and_then(BinId::parse),
        Err(err) => {
            warn!("ignoring unparsable share url {share_url:?}: {err}");
            None
        }
    }
}

pub fn share_url_for(public_url: &str, bin_id: &BinId) -> Option<String> {
    let mut url = match Url::parse(public_url) {
        Ok(url) => url,
        Err(err) => {
            warn!("public url {public_url:?} is not a valid url: {err}");
            return None;
        }
    };
    url.set_fragment(Some(bin_id.as_str()));
    Some(url.to_string())
}

/// Picks the bin for this process: the share-url fragment, then the id
/// remembered on this device, then a freshly created bin. A failed create
/// leaves the session unbound.
pub async fn resolve_session(
    client: &BinClient,
    storage: &DeviceStorage,
    share_url: Option<&str>,
    public_url: &str,
) -> BinSession {
    let existing = match share_url.and_then(bin_id_from_share_url) {
        Some(id) => Some(id),
        None => storage.get(BIN_ID_KEY).await.as_deref().and_then(BinId::parse),
    };

    let bin_id = match existing {
        Some(id) => id,
        None => {
            let empty = serde_json::to_value(RecordsDocument::default()).unwrap_or(Value::Null);
            match client.create(&empty).await {
                Ok(created) => match BinId::parse(&created.id) {
                    Some(id) => {
                        info!("created bin {id}");
                        id
                    }
                    None => {
                        warn!("bin store returned a blank id, continuing without remote storage");
                        return BinSession::default();
                    }
                },
                Err(err) => {
                    warn!("failed to create bin, continuing without remote storage: {err}");
                    return BinSession::default();
                }
            }
        }
    };

    if let Err(err) = storage.set(BIN_ID_KEY, bin_id.as_str()).await {
        warn!("failed to remember bin id {bin_id}: {err}");
    }

    BinSession::bound(bin_id, public_url)
}

/// Records kept in a remote bin, replaced wholesale on every save.
pub struct RemotePersistence {
    client: BinClient,
    bin_id: Option<BinId>,
}

impl RemotePersistence {
    pub fn new(client: BinClient, bin_id: Option<BinId>) -> Self {
        Self { client, bin_id }
    }
}

#[async_trait]
impl RecordPersistence for RemotePersistence {
    async fn load(&self) -> Result<RecordsDocument, PersistenceError> {
        let Some(bin_id) = &self.bin_id else {
            return Ok(RecordsDocument::default());
        };
        let body = self.client.read(bin_id.as_str()).await?;
        let document = serde_json::from_value(body)
            .map_err(|e| BinClientError::Parsing(e.to_string()))?;
        Ok(document)
    }

    async fn save(&self, document: &RecordsDocument) -> Result<SaveOutcome, PersistenceError> {
        let Some(bin_id) = &self.bin_id else {
            return Ok(SaveOutcome::Skipped);
        };
        let body = serde_json::to_value(document)?;
        self.client.replace(bin_id.as_str(), &body).await?;
        Ok(SaveOutcome::Saved)
    }

    fn describe(&self) -> &'static str {
        "remote"
    }
}

pub async fn connect_remote(
    client: BinClient,
    storage: Arc<DeviceStorage>,
    share_url: Option<&str>,
    public_url: &str,
) -> (RemotePersistence, BinSession) {
    let session = resolve_session(&client, &storage, share_url, public_url).await;
    let persistence = RemotePersistence::new(client, session.bin_id.clone());
    (persistence, session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_becomes_bin_id() {
        let id = bin_id_from_share_url("https://juggle.example/#abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn empty_fragment_is_ignored() {
        assert!(bin_id_from_share_url("https://juggle.example/#").is_none());
        assert!(bin_id_from_share_url("https://juggle.example/").is_none());
        assert!(bin_id_from_share_url("not a url").is_none());
    }

    #[test]
    fn share_url_carries_bin_id_in_fragment() {
        let id = BinId::parse("xyz").unwrap();
        assert_eq!(
            share_url_for("http://localhost:8080", &id).as_deref(),
            Some("http://localhost:8080/#xyz")
        );
    }

    #[tokio::test]
    async fn remembered_id_is_used_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path().join("device.json"));
        storage.set(BIN_ID_KEY, "remembered").await.unwrap();
        // Nothing listens here, so any create call would fail.
        let client = BinClient::new(reqwest::Client::new(), "http://127.0.0.1:9/api/bins");

        let session = resolve_session(&client, &storage, None, "http://localhost:8080").await;
        assert_eq!(session.bin_id.as_ref().map(BinId::as_str), Some("remembered"));
    }

    #[tokio::test]
    async fn share_url_beats_remembered_id_and_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path().join("device.json"));
        storage.set(BIN_ID_KEY, "old").await.unwrap();
        let client = BinClient::new(reqwest::Client::new(), "http://127.0.0.1:9/api/bins");

        let session = resolve_session(
            &client,
            &storage,
            Some("https://juggle.example/#shared"),
            "http://localhost:8080",
        )
        .await;
        assert_eq!(session.bin_id.as_ref().map(BinId::as_str), Some("shared"));
        assert_eq!(session.share_url.as_deref(), Some("http://localhost:8080/#shared"));
        assert_eq!(storage.get(BIN_ID_KEY).await.as_deref(), Some("shared"));
    }

    #[tokio::test]
    async fn failed_create_leaves_session_unbound_and_saves_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(DeviceStorage::new(dir.path().join("device.json")));
        let client = BinClient::new(reqwest::Client::new(), "http://127.0.0.1:9/api/bins");

        let (remote, session) = connect_remote(client, Arc::clone(&storage), None, "http://localhost:8080").await;
        assert_eq!(session, BinSession::default());
        assert_eq!(storage.get(BIN_ID_KEY).await, None);

        let outcome = remote.save(&RecordsDocument::default()).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped);
        assert!(remote.load().await.unwrap().records.is_empty());
    }
}
