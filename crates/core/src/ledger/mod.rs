//! Shared-expense ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (expenses and settlements) with materialized splits
//! - Entry validation rules
//! - The balance engine: apply, reverse, and full recompute
//! - Error types for ledger operations

pub mod balance;
pub mod entry;
pub mod error;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{BalanceEngine, BalanceMap};
pub use entry::{EntryDraft, LedgerEntry};
pub use error::LedgerError;
pub use validation::validate_entry;
