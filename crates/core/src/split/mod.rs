//! Split strategies and per-participant amount allocation.
//!
//! The split calculator turns an entry's total amount into the materialized
//! per-participant owed mapping. Allocation uses the Largest Remainder
//! Method so the split sum always equals the total exactly.

pub mod calculator;
pub mod error;

#[cfg(test)]
mod calculator_props;

pub use calculator::{Split, SplitCalculator, SplitSpec, SplitType};
pub use error::SplitError;
