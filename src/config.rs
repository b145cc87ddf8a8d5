//! Runtime configuration from environment variables

use std::path::PathBuf;

use crate::ledger::ValidationPolicy;

pub const DATABASE_PATH_VAR: &str = "FITLEDGER_DATABASE_PATH";
pub const STRICT_VALIDATION_VAR: &str = "FITLEDGER_STRICT_VALIDATION";

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub database_path: PathBuf,
    pub validation: ValidationPolicy,
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        let strict = std::env::var(STRICT_VALIDATION_VAR).ok();
        Self {
            database_path: database_path(std::env::var(DATABASE_PATH_VAR).ok()),
            validation: validation_policy(strict.as_deref()),
        }
    }
}

/// Explicit path, or `data/fitledger.db` next to the project root
fn database_path(explicit: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("fitledger.db");
    path
}

fn validation_policy(raw: Option<&str>) -> ValidationPolicy {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("1") | Some("true") | Some("yes") => ValidationPolicy::NonNegative,
        _ => ValidationPolicy::Permissive,
    }
}
