//! SQLite-backed snapshot storage

use rusqlite::{params, OptionalExtension};

use super::{LedgerSnapshot, SnapshotError, SnapshotStore, StoredSnapshot};
use crate::db::{migrations, Database};

/// Keeps the latest ledger snapshot in the `ledger_snapshot` table
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    database: Database,
}

impl SqliteSnapshotStore {
    /// Wrap a database, running migrations first
    pub fn new(database: Database) -> Result<Self, SnapshotError> {
        database.with_conn(|conn| migrations::run_migrations(conn))?;
        Ok(Self { database })
    }

    /// Raw stored payload and its revision, without parsing
    pub fn load_raw(&self) -> Result<Option<(u64, String)>, SnapshotError> {
        let row = self.database.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT revision, payload FROM ledger_snapshot WHERE id = 1",
                    [],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;
            Ok(row)
        })?;
        Ok(row.map(|(revision, payload)| (revision.max(0) as u64, payload)))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> Result<Option<StoredSnapshot>, SnapshotError> {
        match self.load_raw()? {
            Some((revision, payload)) => Ok(Some(StoredSnapshot {
                revision,
                snapshot: LedgerSnapshot::from_json(&payload)?,
            })),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot, revision: u64) -> Result<(), SnapshotError> {
        let payload = snapshot.to_json()?;
        self.database.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO ledger_snapshot (id, version, revision, payload, updated_at)
                VALUES (1, ?1, ?2, ?3, datetime('now'))
                ON CONFLICT(id) DO UPDATE SET
                    version = excluded.version,
                    revision = excluded.revision,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
                params![snapshot.version, revision as i64, payload],
            )?;
            Ok(())
        })?;
        Ok(())
    }
}
