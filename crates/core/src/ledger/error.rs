//! Error types for ledger operations.

use divvy_shared::types::{EntryId, GroupId, ParticipantId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::split::SplitError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry amount must be positive.
    #[error("Entry amount must be positive")]
    InvalidAmount,

    /// Amount carries more precision than the group currency supports.
    #[error("Amount {0} exceeds the currency's minor-unit precision")]
    PrecisionExceeded(Decimal),

    /// Entry currency differs from the group currency.
    #[error("Entry currency {entry} does not match group currency {group}")]
    CurrencyMismatch {
        /// Currency supplied on the entry.
        entry: String,
        /// The group's currency.
        group: String,
    },

    /// Entry has no splits.
    #[error("Entry must have at least one split")]
    NoSplits,

    /// Splits do not sum to the entry amount.
    #[error("Splits sum to {split_total}, expected {amount}")]
    SplitMismatch {
        /// The entry amount.
        amount: Decimal,
        /// The sum of the materialized splits.
        split_total: Decimal,
    },

    /// The same participant appears in two splits of one entry.
    #[error("Participant {0} appears in more than one split")]
    DuplicateSplitParticipant(ParticipantId),

    /// A referenced participant is not an active member of the group.
    #[error("Participant {0} is not an active member of the group")]
    UnknownParticipant(ParticipantId),

    /// A settlement must have exactly one counterpart split.
    #[error("Settlement must have exactly one counterpart split, found {0}")]
    SettlementShape(usize),

    /// A settlement cannot pay the payer.
    #[error("Settlement counterpart cannot be the payer")]
    SettlementSelf,

    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Entry is already soft-deleted.
    #[error("Entry {0} is already deleted")]
    EntryAlreadyDeleted(EntryId),

    /// Split-strategy error bubbled up from the calculator.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Internal consistency failure: balances no longer sum to zero.
    ///
    /// This is a defect, not a user-facing validation failure. It must
    /// abort the enclosing transaction.
    #[error("Balance invariant violated for group {group_id}: residual {residual}")]
    BalanceInvariantViolated {
        /// The group whose balances are inconsistent.
        group_id: GroupId,
        /// The non-zero residual of the balance sum.
        residual: Decimal,
    },
}

impl LedgerError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount | Self::PrecisionExceeded(_) | Self::CurrencyMismatch { .. } => {
                "INVALID_AMOUNT"
            }
            Self::NoSplits | Self::SplitMismatch { .. } | Self::DuplicateSplitParticipant(_) => {
                "SPLIT_MISMATCH"
            }
            Self::UnknownParticipant(_) => "INVALID_PARTICIPANT",
            Self::SettlementShape(_) | Self::SettlementSelf => "INVALID_OPERATION",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::EntryAlreadyDeleted(_) => "ENTRY_ALREADY_DELETED",
            Self::Split(e) => e.error_code(),
            Self::BalanceInvariantViolated { .. } => "BALANCE_INVARIANT_VIOLATED",
        }
    }

    /// Returns true if this error is an internal consistency defect rather
    /// than a caller-fixable validation failure.
    #[must_use]
    pub const fn is_consistency_defect(&self) -> bool {
        matches!(self, Self::BalanceInvariantViolated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InvalidAmount.error_code(), "INVALID_AMOUNT");
        assert_eq!(
            LedgerError::SplitMismatch {
                amount: dec!(100),
                split_total: dec!(99.99),
            }
            .error_code(),
            "SPLIT_MISMATCH"
        );
        assert_eq!(
            LedgerError::UnknownParticipant(ParticipantId::new()).error_code(),
            "INVALID_PARTICIPANT"
        );
        assert_eq!(
            LedgerError::SettlementShape(3).error_code(),
            "INVALID_OPERATION"
        );
    }

    #[test]
    fn test_consistency_classification() {
        let defect = LedgerError::BalanceInvariantViolated {
            group_id: GroupId::new(),
            residual: dec!(0.01),
        };
        assert!(defect.is_consistency_defect());
        assert_eq!(defect.error_code(), "BALANCE_INVARIANT_VIOLATED");
        assert!(!LedgerError::InvalidAmount.is_consistency_defect());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::SplitMismatch {
            amount: dec!(100.00),
            split_total: dec!(99.99),
        };
        assert_eq!(err.to_string(), "Splits sum to 99.99, expected 100.00");
    }
}
