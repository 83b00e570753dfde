//! Error types for legacy consolidation.
//!
//! These are per-record failures: the batch logs and skips the record,
//! never aborts.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Reasons a single legacy record cannot be consolidated.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    /// The legacy record's currency code is not supported.
    #[error("Legacy record {legacy_id}: unknown currency {currency}")]
    UnknownCurrency {
        /// The legacy record id.
        legacy_id: String,
        /// The unparseable currency code.
        currency: String,
    },

    /// The two-party record has no usable counterpart identity.
    #[error("Legacy record {legacy_id}: missing counterpart identity")]
    MissingCounterpart {
        /// The legacy record id.
        legacy_id: String,
    },

    /// A group member has neither a user reference nor a contact name.
    #[error("Legacy record {legacy_id}: member {member_id} has no identity")]
    MissingMemberIdentity {
        /// The legacy record id.
        legacy_id: String,
        /// The legacy member id.
        member_id: Uuid,
    },

    /// A legacy amount is unusable (non-positive or malformed).
    #[error("Legacy record {legacy_id}: invalid amount {amount}")]
    InvalidAmount {
        /// The legacy record id.
        legacy_id: String,
        /// The offending amount.
        amount: Decimal,
    },

    /// The legacy group has no members.
    #[error("Legacy record {legacy_id}: group has no members")]
    NoMembers {
        /// The legacy record id.
        legacy_id: String,
    },

    /// A legacy transaction references a member the group does not have.
    #[error("Legacy record {legacy_id}: transaction references unknown member {member_id}")]
    UnknownMember {
        /// The legacy record id.
        legacy_id: String,
        /// The unresolvable legacy member id.
        member_id: Uuid,
    },

    /// Replaying the legacy transactions does not reproduce the legacy
    /// stored balance for a member.
    #[error(
        "Legacy record {legacy_id}: member {member_id} balance mismatch \
         (stored {stored}, replayed {replayed})"
    )]
    BalanceMismatch {
        /// The legacy record id.
        legacy_id: String,
        /// The legacy member id.
        member_id: Uuid,
        /// The balance the legacy system had stored.
        stored: Decimal,
        /// The balance produced by replaying the transactions.
        replayed: Decimal,
    },

    /// A replayed entry failed ledger validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
