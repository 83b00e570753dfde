//! Repository abstractions for data access.
//!
//! Every balance-mutating operation runs inside one database transaction
//! that exclusively locks the target group's participant rows before
//! reading stored balances, so two concurrent writers can never apply
//! deltas against a stale base. Lock and serialization failures surface as
//! the retryable `StoreError::ConcurrencyConflict`.

pub mod consolidation;
mod convert;
pub mod entry;
pub mod group;

pub use consolidation::{ConsolidationRepository, MigrationStatus};
pub use entry::{EntryFilter, EntryRepository};
pub use group::{GroupRepository, GroupWithParticipants, ParticipantBalance};

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use divvy_core::consolidation::ConsolidationError;
use divvy_core::group::GroupError;
use divvy_core::ledger::LedgerError;

/// Errors surfaced by the repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    /// Participant not found in the group.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(Uuid),

    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Ledger validation or consistency error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Group lifecycle rule violation.
    #[error(transparent)]
    Group(#[from] GroupError),

    /// A legacy record could not be mapped.
    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),

    /// Lock or serialization conflict; safe to retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    /// Stored data violates an invariant the schema should have enforced.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if is_lock_conflict(&err) {
            Self::ConcurrencyConflict
        } else {
            Self::Database(err)
        }
    }
}

/// Postgres reports lock contention as serialization failure (40001),
/// deadlock (40P01), or lock-not-available (55P03).
fn is_lock_conflict(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("40001")
        || message.contains("40P01")
        || message.contains("55P03")
        || message.contains("deadlock detected")
        || message.contains("could not obtain lock")
        || message.contains("canceling statement due to lock timeout")
}

impl StoreError {
    /// Returns true if the operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::ParticipantNotFound(_) => "PARTICIPANT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Group(e) => e.error_code(),
            Self::Consolidation(_) => "CONSOLIDATION_FAILED",
            Self::ConcurrencyConflict => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Maximum attempts for a retryable operation.
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff between attempts; grows linearly.
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Runs a balance-mutating operation, retrying bounded times on
/// lock/serialization conflicts with linear backoff.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or immediately for
/// non-retryable errors.
pub async fn with_retries<T, F, Fut>(mut operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                warn!(attempt, error = %err, "Store conflict, backing off before retry");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
