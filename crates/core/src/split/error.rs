//! Error types for split calculation.

use divvy_shared::types::ParticipantId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while computing or validating splits.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Entry amount must be positive.
    #[error("Amount must be positive")]
    InvalidAmount,

    /// Amount carries more precision than the currency supports.
    #[error("Amount {0} exceeds the currency's minor-unit precision")]
    PrecisionExceeded(Decimal),

    /// No active participants to split across.
    #[error("Cannot split across an empty participant set")]
    EmptyParticipants,

    /// A referenced participant is not an active member of the group.
    #[error("Participant {0} is not an active member of the group")]
    UnknownParticipant(ParticipantId),

    /// The same participant appears twice in the strategy parameters.
    #[error("Participant {0} appears more than once")]
    DuplicateParticipant(ParticipantId),

    /// A supplied split amount is negative.
    #[error("Split amount for participant {participant} is negative: {amount}")]
    NegativeSplit {
        /// The offending participant.
        participant: ParticipantId,
        /// The supplied amount.
        amount: Decimal,
    },

    /// Supplied splits do not sum to the entry amount.
    #[error("Splits sum to {split_total}, expected {amount}")]
    SplitMismatch {
        /// The entry amount.
        amount: Decimal,
        /// The sum of the supplied splits.
        split_total: Decimal,
    },

    /// Percentages do not sum to 100.
    #[error("Percentages sum to {0}, expected 100")]
    InvalidPercentageTotal(Decimal),

    /// A share weight must be a positive integer.
    #[error("Share weight for participant {0} must be positive")]
    ZeroWeight(ParticipantId),

    /// A full split requires a two-party group.
    #[error("Full split requires at most 2 active participants, group has {0}")]
    FullSplitTooManyParticipants(usize),

    /// The full-split debtor cannot be the payer.
    #[error("Full-split debtor cannot be the payer")]
    FullSplitSelf,
}

impl SplitError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount | Self::PrecisionExceeded(_) => "INVALID_AMOUNT",
            Self::EmptyParticipants
            | Self::UnknownParticipant(_)
            | Self::DuplicateParticipant(_) => "INVALID_PARTICIPANT",
            Self::NegativeSplit { .. }
            | Self::SplitMismatch { .. }
            | Self::InvalidPercentageTotal(_)
            | Self::ZeroWeight(_) => "SPLIT_MISMATCH",
            Self::FullSplitTooManyParticipants(_) | Self::FullSplitSelf => "INVALID_OPERATION",
        }
    }
}
