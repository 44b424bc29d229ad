use crate::models::RecordsDocument;
use crate::persistence::{RecordPersistence, SaveOutcome};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

/// Fire-and-forget saving. Callers hand over a snapshot and move on; a
/// background task writes the newest one. Snapshots superseded before the
/// task gets to them are never written.
#[derive(Clone)]
pub struct SaveScheduler {
    tx: Arc<watch::Sender<Option<RecordsDocument>>>,
}

impl SaveScheduler {
    pub fn spawn(persistence: Arc<dyn RecordPersistence>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(run(persistence, rx));
        (Self { tx: Arc::new(tx) }, handle)
    }

    pub fn schedule(&self, document: RecordsDocument) {
        // No receiver means the writer is gone; in-memory state stays authoritative.
        let _ = self.tx.send(Some(document));
    }
}

async fn run(persistence: Arc<dyn RecordPersistence>, mut rx: watch::Receiver<Option<RecordsDocument>>) {
    while rx.changed().await.is_ok() {
        let Some(document) = rx.borrow_and_update().clone() else {
            continue;
        };

        match persistence.save(&document).await {
            Ok(SaveOutcome::Saved) => debug!(
                records = document.records.len(),
                storage = persistence.describe(),
                "records saved"
            ),
            Ok(SaveOutcome::Skipped) => debug!("no bound storage, save skipped"),
            Err(err) => warn!(storage = persistence.describe(), "save failed, keeping in-memory records: {err}"),
        }
    }
}
