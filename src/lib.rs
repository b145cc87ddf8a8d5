//! FitLedger Library
//!
//! Daily activity ledger for fitness tracking: date-partitioned food,
//! exercise, water, steps and active minutes with durable snapshots.

pub mod build_info;
pub mod config;
pub mod db;
pub mod ledger;
pub mod mcp;
pub mod models;
pub mod persistence;
pub mod tools;
