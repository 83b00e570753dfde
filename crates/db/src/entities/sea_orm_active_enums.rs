//! `SeaORM` active enums mirroring the database enum types.
//!
//! Conversions to and from the core domain enums live here so the
//! repositories never match on raw strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Database enum `group_mode`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "group_mode")]
pub enum GroupMode {
    /// Strict two-party debt.
    #[sea_orm(string_value = "one_to_one")]
    OneToOne,
    /// Multi-party expense group.
    #[sea_orm(string_value = "multi_party")]
    MultiParty,
}

/// Database enum `group_kind`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "group_kind")]
pub enum GroupKind {
    /// Two-party lend/borrow relationship.
    #[sea_orm(string_value = "personal_debt")]
    PersonalDebt,
    /// General shared-expense group.
    #[sea_orm(string_value = "group_expense")]
    GroupExpense,
    /// Trip.
    #[sea_orm(string_value = "trip")]
    Trip,
    /// Household.
    #[sea_orm(string_value = "household")]
    Household,
}

/// Database enum `debt_direction`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_direction")]
pub enum DebtDirection {
    /// The creator lent money.
    #[sea_orm(string_value = "lend")]
    Lend,
    /// The creator borrowed money.
    #[sea_orm(string_value = "borrow")]
    Borrow,
}

/// Database enum `participant_role`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "participant_role")]
pub enum ParticipantRole {
    /// The group's creator.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Can manage members and entries.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}

/// Database enum `split_type`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "split_type")]
pub enum SplitType {
    /// Equal shares.
    #[sea_orm(string_value = "equal")]
    Equal,
    /// Caller-supplied amounts.
    #[sea_orm(string_value = "custom")]
    Custom,
    /// Percentage-based.
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// Weight-based.
    #[sea_orm(string_value = "shares")]
    Shares,
    /// One debtor owes everything.
    #[sea_orm(string_value = "full")]
    Full,
}

impl From<divvy_core::group::GroupMode> for GroupMode {
    fn from(mode: divvy_core::group::GroupMode) -> Self {
        match mode {
            divvy_core::group::GroupMode::OneToOne => Self::OneToOne,
            divvy_core::group::GroupMode::MultiParty => Self::MultiParty,
        }
    }
}

impl From<GroupMode> for divvy_core::group::GroupMode {
    fn from(mode: GroupMode) -> Self {
        match mode {
            GroupMode::OneToOne => Self::OneToOne,
            GroupMode::MultiParty => Self::MultiParty,
        }
    }
}

impl From<divvy_core::group::GroupKind> for GroupKind {
    fn from(kind: divvy_core::group::GroupKind) -> Self {
        match kind {
            divvy_core::group::GroupKind::PersonalDebt => Self::PersonalDebt,
            divvy_core::group::GroupKind::GroupExpense => Self::GroupExpense,
            divvy_core::group::GroupKind::Trip => Self::Trip,
            divvy_core::group::GroupKind::Household => Self::Household,
        }
    }
}

impl From<GroupKind> for divvy_core::group::GroupKind {
    fn from(kind: GroupKind) -> Self {
        match kind {
            GroupKind::PersonalDebt => Self::PersonalDebt,
            GroupKind::GroupExpense => Self::GroupExpense,
            GroupKind::Trip => Self::Trip,
            GroupKind::Household => Self::Household,
        }
    }
}

impl From<divvy_core::group::DebtDirection> for DebtDirection {
    fn from(direction: divvy_core::group::DebtDirection) -> Self {
        match direction {
            divvy_core::group::DebtDirection::Lend => Self::Lend,
            divvy_core::group::DebtDirection::Borrow => Self::Borrow,
        }
    }
}

impl From<DebtDirection> for divvy_core::group::DebtDirection {
    fn from(direction: DebtDirection) -> Self {
        match direction {
            DebtDirection::Lend => Self::Lend,
            DebtDirection::Borrow => Self::Borrow,
        }
    }
}

impl From<divvy_core::group::ParticipantRole> for ParticipantRole {
    fn from(role: divvy_core::group::ParticipantRole) -> Self {
        match role {
            divvy_core::group::ParticipantRole::Owner => Self::Owner,
            divvy_core::group::ParticipantRole::Admin => Self::Admin,
            divvy_core::group::ParticipantRole::Member => Self::Member,
        }
    }
}

impl From<ParticipantRole> for divvy_core::group::ParticipantRole {
    fn from(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Owner => Self::Owner,
            ParticipantRole::Admin => Self::Admin,
            ParticipantRole::Member => Self::Member,
        }
    }
}

impl From<divvy_core::split::SplitType> for SplitType {
    fn from(split_type: divvy_core::split::SplitType) -> Self {
        match split_type {
            divvy_core::split::SplitType::Equal => Self::Equal,
            divvy_core::split::SplitType::Custom => Self::Custom,
            divvy_core::split::SplitType::Percentage => Self::Percentage,
            divvy_core::split::SplitType::Shares => Self::Shares,
            divvy_core::split::SplitType::Full => Self::Full,
        }
    }
}

impl From<SplitType> for divvy_core::split::SplitType {
    fn from(split_type: SplitType) -> Self {
        match split_type {
            SplitType::Equal => Self::Equal,
            SplitType::Custom => Self::Custom,
            SplitType::Percentage => Self::Percentage,
            SplitType::Shares => Self::Shares,
            SplitType::Full => Self::Full,
        }
    }
}
