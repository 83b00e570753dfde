//! Group and participant domain types.

use chrono::{DateTime, Utc};
use divvy_shared::types::{Currency, GroupId, ParticipantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a group is a strict two-party debt or a multi-party expense
/// group. Immutable after creation; a new group must be created to switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Exactly two participants for the lifetime of the group.
    OneToOne,
    /// Any number of participants; members can be added and removed.
    MultiParty,
}

/// Category tag for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// A two-party lend/borrow relationship.
    PersonalDebt,
    /// A general shared-expense group.
    GroupExpense,
    /// A trip.
    Trip,
    /// A household.
    Household,
}

/// The originating direction of a one-to-one debt.
///
/// Descriptive metadata only: it records how the relationship started and
/// is never the source of truth for the current balance sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// The creator lent money (the counterpart owes the creator).
    Lend,
    /// The creator borrowed money (the creator owes the counterpart).
    Borrow,
}

/// Participant role within a group. Authorization metadata only; never
/// balance-relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// The group's creator.
    Owner,
    /// Can manage members and entries.
    Admin,
    /// Regular member.
    Member,
}

/// The party behind a participant: a registered user or an external
/// contact who has no account. Polymorphic, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PartyRef {
    /// A registered user.
    User {
        /// The resolved user id.
        user_id: UserId,
    },
    /// An external contact without an account.
    Contact {
        /// Display name.
        name: String,
        /// Optional e-mail address.
        email: Option<String>,
    },
}

/// A ledger group: the container for participants and entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: GroupId,
    /// Two-party debt or multi-party expense group.
    pub mode: GroupMode,
    /// Category tag.
    pub kind: GroupKind,
    /// Display name (MultiParty).
    pub name: Option<String>,
    /// Counterpart display name (OneToOne).
    pub other_party_name: Option<String>,
    /// Counterpart e-mail (OneToOne).
    pub other_party_email: Option<String>,
    /// Originating debt direction (OneToOne).
    pub debt_direction: Option<DebtDirection>,
    /// The group's single currency.
    pub currency: Currency,
    /// False once the group has been archived.
    pub is_active: bool,
    /// The user who created the group.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A party with a running balance within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier.
    pub id: ParticipantId,
    /// The owning group.
    pub group_id: GroupId,
    /// The registered user or external contact behind this participant.
    pub party: PartyRef,
    /// Authorization role.
    pub role: ParticipantRole,
    /// Signed running balance: positive means the group owes this
    /// participant, negative means they owe the group.
    pub balance: Decimal,
    /// False once the participant has been removed from the group.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_ref_serde_tagging() {
        let contact = PartyRef::Contact {
            name: "Maya".to_string(),
            email: None,
        };
        let json = serde_json::to_string(&contact).unwrap();
        assert!(json.contains("\"kind\":\"contact\""));

        let user = PartyRef::User {
            user_id: UserId::new(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"kind\":\"user\""));
    }
}
