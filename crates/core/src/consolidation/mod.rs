//! Legacy data model consolidation.
//!
//! Maps the two legacy subsystems (the two-party lend/borrow tracker and
//! the multi-party group-expense tracker) into the unified ledger schema,
//! preserving net economic position. The mapping here is pure; the
//! transactional, idempotent batch runner lives in the db crate.
//!
//! Forward consolidation is one-way. There is no reverse migration;
//! operators take a point-in-time backup before running the batch.

pub mod error;
pub mod service;
pub mod types;

pub use error::ConsolidationError;
pub use service::{ConsolidationService, MigratedGroup, MigrationOutcome};
pub use types::{
    ConsolidationSummary, LegacyDebtRecord, LegacyGroupRecord, LegacyMember, LegacyRecord,
    LegacyShare, LegacySplitType, LegacyTransaction,
};
