//! Background snapshot writer
//!
//! Mutators hand over a snapshot and move on. A single task writes snapshots
//! in revision order, skipping any that were superseded while a write was in
//! flight. Outcomes are published on a watch channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{LedgerSnapshot, SnapshotError, SnapshotStore};

/// Observable progress of durable writes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteStatus {
    /// Newest revision the writer has finished with, successfully or not
    pub last_attempted_revision: Option<u64>,
    /// Newest revision known to be on disk
    pub last_durable_revision: Option<u64>,
    pub last_written_at: Option<String>,
    pub last_error: Option<String>,
    pub failed_writes: u64,
}

struct PendingWrite {
    revision: u64,
    snapshot: LedgerSnapshot,
}

/// Handle to the writer task
#[derive(Clone)]
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<PendingWrite>,
    status: watch::Receiver<WriteStatus>,
}

impl SnapshotWriter {
    /// Start the writer task on the current tokio runtime
    pub fn spawn(store: Arc<dyn SnapshotStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(WriteStatus::default());
        tokio::spawn(run_writer(store, rx, status_tx));
        Self {
            tx,
            status: status_rx,
        }
    }

    /// Queue a snapshot. Never blocks and never fails the caller.
    pub fn submit(&self, revision: u64, snapshot: LedgerSnapshot) {
        if self.tx.send(PendingWrite { revision, snapshot }).is_err() {
            warn!(revision, "snapshot writer stopped; write dropped");
        }
    }

    pub fn status(&self) -> WriteStatus {
        self.status.borrow().clone()
    }

    /// Wait until the writer has attempted `revision` or a later one
    pub async fn wait_for_revision(&self, revision: u64) -> WriteStatus {
        let mut rx = self.status.clone();
        let reached = rx
            .wait_for(|s| s.last_attempted_revision.is_some_and(|r| r >= revision))
            .await
            .map(|s| s.clone());
        reached.unwrap_or_else(|_| self.status())
    }
}

async fn run_writer(
    store: Arc<dyn SnapshotStore>,
    mut rx: mpsc::UnboundedReceiver<PendingWrite>,
    status: watch::Sender<WriteStatus>,
) {
    while let Some(mut pending) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            pending = newer;
        }

        let PendingWrite { revision, snapshot } = pending;
        let store = Arc::clone(&store);
        let result = tokio::task::spawn_blocking(move || store.save(&snapshot, revision))
            .await
            .map_err(|e| SnapshotError::Task(e.to_string()))
            .and_then(|r| r);

        match &result {
            Ok(()) => debug!(revision, "snapshot written"),
            Err(e) => warn!(revision, error = %e, "snapshot write failed"),
        }

        status.send_modify(|s| {
            s.last_attempted_revision = Some(revision);
            match result {
                Ok(()) => {
                    s.last_durable_revision = Some(revision);
                    s.last_written_at = Some(chrono::Utc::now().to_rfc3339());
                    s.last_error = None;
                }
                Err(e) => {
                    s.failed_writes += 1;
                    s.last_error = Some(e.to_string());
                }
            }
        });
    }

    debug!("snapshot writer exiting");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ledger::DateKey;
    use crate::persistence::StoredSnapshot;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<u64>>,
        fail: bool,
    }

    impl SnapshotStore for RecordingStore {
        fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError> {
            Ok(None)
        }

        fn save(&self, _snapshot: &LedgerSnapshot, revision: u64) -> Result<(), SnapshotError> {
            if self.fail {
                return Err(SnapshotError::Task("disk full".into()));
            }
            self.saved.lock().unwrap().push(revision);
            Ok(())
        }
    }

    fn snapshot() -> LedgerSnapshot {
        LedgerSnapshot::empty(DateKey::parse("2025-01-09").unwrap())
    }

    #[tokio::test]
    async fn test_writes_reach_latest_revision() {
        let store = Arc::new(RecordingStore::default());
        let writer = SnapshotWriter::spawn(store.clone());

        for revision in 1..=5 {
            writer.submit(revision, snapshot());
        }

        let status = writer.wait_for_revision(5).await;
        assert_eq!(status.last_durable_revision, Some(5));
        assert_eq!(status.last_error, None);

        let saved = store.saved.lock().unwrap().clone();
        assert_eq!(saved.last(), Some(&5));
        assert!(saved.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_failures_are_recorded_not_raised() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let writer = SnapshotWriter::spawn(store);

        writer.submit(1, snapshot());

        let status = writer.wait_for_revision(1).await;
        assert_eq!(status.last_durable_revision, None);
        assert_eq!(status.failed_writes, 1);
        assert!(status.last_error.unwrap().contains("disk full"));
    }
}
