//! Persistence module
//!
//! Durable snapshots of the ledger: the format, the storage backend, and the
//! background task that writes them.

mod snapshot;
mod sqlite;
mod writer;

pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use sqlite::SqliteSnapshotStore;
pub use writer::{SnapshotWriter, WriteStatus};

use thiserror::Error;

use crate::db::DbError;

/// Snapshot storage error types
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Snapshot task failed: {0}")]
    Task(String),
}

/// A snapshot as read back from storage, with the revision it was written at
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub revision: u64,
    pub snapshot: LedgerSnapshot,
}

/// Durable home for the latest ledger snapshot.
///
/// Calls block; async callers go through `spawn_blocking`.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Latest stored snapshot, or `None` if nothing was ever written
    fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError>;

    /// Replace the stored snapshot
    fn save(&self, snapshot: &LedgerSnapshot, revision: u64) -> Result<(), SnapshotError>;
}
