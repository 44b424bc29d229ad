pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod offline;
pub mod persistence;
pub mod proxy;
pub mod ranking;
pub mod remote;
pub mod saver;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::{AppConfig, StorageKind};
pub use persistence::{LocalPersistence, RecordPersistence};
pub use remote::{BinClient, BinSession, RemotePersistence};
pub use saver::SaveScheduler;
pub use state::AppState;
pub use storage::DeviceStorage;
pub use store::RecordStore;
