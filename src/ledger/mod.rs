//! Daily activity ledger
//!
//! Date-partitioned food, exercise, water, steps and active minutes, with
//! derived day totals and a hydration lifecycle.

pub mod aggregate;
pub mod date_key;
mod error;
mod state;
mod store;

pub use aggregate::{calculate_day_totals, DailyTotals};
pub use date_key::{Clock, DateKey, SystemClock};
pub use error::{LedgerError, LedgerResult};
pub use state::{Counter, LedgerState, Mutation};
pub use store::{DaySummary, HydrationState, LedgerStore, ValidationPolicy};
