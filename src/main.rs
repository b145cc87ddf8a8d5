//! FitLedger
//!
//! An MCP server over the daily activity ledger.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use fitledger::build_info;
use fitledger::config::LedgerConfig;
use fitledger::db::Database;
use fitledger::ledger::LedgerStore;
use fitledger::mcp::FitLedgerService;
use fitledger::persistence::SqliteSnapshotStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr to not interfere with MCP stdio
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fitledger=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    let config = LedgerConfig::from_env();
    tracing::info!(
        database = %config.database_path.display(),
        validation = ?config.validation,
        "starting FitLedger"
    );

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    let snapshots = SqliteSnapshotStore::new(database)?;

    // Hydration runs in the background; mutations arriving first are queued
    let ledger = LedgerStore::open(Arc::new(snapshots), config.validation);

    let service = FitLedgerService::new(config.database_path.clone(), ledger.clone());

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    let status = ledger.flush().await;
    tracing::info!(
        durable_revision = ?status.last_durable_revision,
        failed_writes = status.failed_writes,
        "FitLedger stopped"
    );

    Ok(())
}
