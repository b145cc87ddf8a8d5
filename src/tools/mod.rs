//! FitLedger Tools module
//!
//! MCP tool implementations over the daily activity ledger.

pub mod entries;
pub mod status;
