//! Error types for group lifecycle operations.

use divvy_shared::types::ParticipantId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during group lifecycle operations.
#[derive(Debug, Error)]
pub enum GroupError {
    /// One-to-one groups keep their two participants for life.
    #[error("Cannot add or remove participants on a one-to-one group")]
    OneToOneParticipantsImmutable,

    /// A participant with outstanding balance cannot be removed.
    #[error("Participant {participant} has outstanding balance {balance}; settle first")]
    OutstandingBalance {
        /// The participant that was to be removed.
        participant: ParticipantId,
        /// Their current balance.
        balance: Decimal,
    },

    /// The group still has outstanding balances and deactivation was not
    /// forced.
    #[error("Group has outstanding balances; settle first or force deactivation")]
    OutstandingGroupBalance,

    /// The group has been archived.
    #[error("Group is inactive")]
    GroupInactive,

    /// The participant has been removed from the group.
    #[error("Participant {0} is inactive")]
    ParticipantInactive(ParticipantId),

    /// A display name is required and cannot be blank.
    #[error("Name cannot be blank")]
    BlankName,

    /// A multi-party group needs at least one member besides the creator.
    #[error("A multi-party group needs at least one member besides the creator")]
    NoMembers,

    /// The same registered user was listed twice.
    #[error("Duplicate member")]
    DuplicateMember,
}

impl GroupError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::OneToOneParticipantsImmutable => "INVALID_OPERATION",
            Self::OutstandingBalance { .. } | Self::OutstandingGroupBalance => {
                "OUTSTANDING_BALANCE"
            }
            Self::GroupInactive | Self::ParticipantInactive(_) => "INACTIVE",
            Self::BlankName | Self::NoMembers | Self::DuplicateMember => "VALIDATION_ERROR",
        }
    }
}
