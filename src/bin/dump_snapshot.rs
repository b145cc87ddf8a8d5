//! Utility to print the stored ledger snapshot

use fitledger::config::LedgerConfig;
use fitledger::db::{migrations, Database};
use fitledger::persistence::{LedgerSnapshot, SqliteSnapshotStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    if !config.database_path.exists() {
        eprintln!("No database found");
        return Ok(());
    }

    let database = Database::new(&config.database_path)?;
    if database.with_conn(|conn| migrations::needs_migration(conn))? {
        eprintln!("Database has no ledger schema yet");
        return Ok(());
    }

    let store = SqliteSnapshotStore::new(database)?;
    match store.load_raw()? {
        Some((revision, payload)) => {
            eprintln!("Revision: {}", revision);
            match LedgerSnapshot::from_json(&payload) {
                Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                Err(e) => {
                    eprintln!("Snapshot does not parse ({}); raw payload follows", e);
                    println!("{}", payload);
                }
            }
        }
        None => eprintln!("No snapshot stored"),
    }

    Ok(())
}
