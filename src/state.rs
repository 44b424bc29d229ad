use crate::config::AppConfig;
use crate::remote::{BinClient, BinSession};
use crate::saver::SaveScheduler;
use crate::store::RecordStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Mutex<RecordStore>>,
    pub saver: SaveScheduler,
    pub session: Arc<BinSession>,
    /// Upstream bin store behind the `/api/bins` proxy routes.
    pub upstream: BinClient,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: RecordStore,
        saver: SaveScheduler,
        session: BinSession,
        upstream: BinClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
            saver,
            session: Arc::new(session),
            upstream,
        }
    }

    pub fn storage_name(&self) -> &'static str {
        match self.config.storage {
            crate::config::StorageKind::Local => "local",
            crate::config::StorageKind::Remote => "remote",
        }
    }
}
