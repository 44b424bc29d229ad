use juggle_records::{
    AppConfig, AppState, BinClient, BinSession, DeviceStorage, LocalPersistence, RecordPersistence, RecordStore,
    SaveScheduler, StorageKind, models::RecordsDocument, remote::connect_remote, router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let device = Arc::new(DeviceStorage::new(&config.data_path));
    let http = reqwest::Client::new();
    let upstream = BinClient::new(http.clone(), &config.upstream_bin_url);

    let (persistence, session): (Arc<dyn RecordPersistence>, BinSession) = match config.storage {
        StorageKind::Local => (
            Arc::new(LocalPersistence::new(Arc::clone(&device))) as Arc<dyn RecordPersistence>,
            BinSession::default(),
        ),
        StorageKind::Remote => {
            let client = BinClient::new(http.clone(), &config.bin_api_url);
            let (remote, session) = connect_remote(
                client,
                Arc::clone(&device),
                config.share_url.as_deref(),
                &config.public_url,
            )
            .await;
            (Arc::new(remote) as Arc<dyn RecordPersistence>, session)
        }
    };

    let document = match persistence.load().await {
        Ok(document) => document,
        Err(err) => {
            warn!("failed to load records, starting with an empty collection: {err}");
            RecordsDocument::default()
        }
    };
    info!(
        records = document.records.len(),
        storage = persistence.describe(),
        "records loaded"
    );
    if let Some(url) = &session.share_url {
        info!("share this leaderboard: {url}");
    }

    let (saver, writer) = SaveScheduler::spawn(persistence);
    let port = config.port;
    let state = AppState::new(config, RecordStore::from(document), saver, session, upstream);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last scheduler handle; let the writer finish its final save.
    let _ = writer.await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
