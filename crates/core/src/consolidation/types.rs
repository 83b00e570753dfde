//! Legacy data model types.
//!
//! These mirror the export format of the two retired subsystems. Records
//! arrive as a JSON array of tagged objects, one per legacy aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use divvy_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::group::DebtDirection;

/// One record of the legacy export: either a two-party debt or a
/// multi-party group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegacyRecord {
    /// A two-party lend/borrow record.
    Debt(LegacyDebtRecord),
    /// A multi-party group with members and transactions.
    Group(LegacyGroupRecord),
}

impl LegacyRecord {
    /// The legacy system's identifier, used for idempotency.
    #[must_use]
    pub fn legacy_id(&self) -> &str {
        match self {
            Self::Debt(record) => &record.id,
            Self::Group(record) => &record.id,
        }
    }
}

/// A record of the legacy two-party lend/borrow tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDebtRecord {
    /// Legacy identifier.
    pub id: String,
    /// The user who created the record.
    pub creator: UserId,
    /// The counterpart, when they had an account.
    pub counterpart_user: Option<UserId>,
    /// The counterpart's display name.
    pub counterpart_name: Option<String>,
    /// The counterpart's e-mail.
    pub counterpart_email: Option<String>,
    /// Whether the creator lent or borrowed.
    pub direction: DebtDirection,
    /// The original debt amount.
    pub amount: Decimal,
    /// How much has been paid back so far.
    pub amount_paid: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// When the debt was recorded.
    pub created_at: DateTime<Utc>,
}

/// A record of the legacy multi-party group-expense tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyGroupRecord {
    /// Legacy identifier.
    pub id: String,
    /// Group display name.
    pub name: String,
    /// The user who created the group.
    pub creator: UserId,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Group members with their stored balances.
    pub members: Vec<LegacyMember>,
    /// The group's transaction history.
    pub transactions: Vec<LegacyTransaction>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

/// A member of a legacy group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyMember {
    /// Legacy member id, referenced by transactions.
    pub id: Uuid,
    /// The member's account, if registered.
    pub user_id: Option<UserId>,
    /// Display name for unregistered members.
    pub name: Option<String>,
    /// E-mail for unregistered members.
    pub email: Option<String>,
    /// Free-form role string; unknown values map to `member`.
    pub role: Option<String>,
    /// The balance the legacy system had stored, used for reconciliation.
    pub balance: Decimal,
    /// Whether the member was still in the group.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A transaction of a legacy group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyTransaction {
    /// Legacy transaction id.
    pub id: Uuid,
    /// Description.
    pub description: String,
    /// Total amount.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
    /// The legacy member who paid.
    pub paid_by: Uuid,
    /// The legacy split strategy tag.
    pub split_type: LegacySplitType,
    /// Materialized per-member owed amounts.
    pub shares: Vec<LegacyShare>,
    /// Whether this transaction was a settlement.
    #[serde(default)]
    pub is_settlement: bool,
    /// Whether the legacy system had soft-deleted this transaction.
    #[serde(default)]
    pub deleted: bool,
    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
    /// The recording user, where the legacy system kept one.
    pub created_by: Option<UserId>,
}

/// Split strategy tags used by the legacy group tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacySplitType {
    /// Divided equally.
    Equal,
    /// Exact per-member amounts.
    Exact,
    /// Percentage-based.
    Percentage,
}

/// One member's share of a legacy transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyShare {
    /// The legacy member id.
    pub member_id: Uuid,
    /// The owed amount.
    pub amount: Decimal,
}

fn default_true() -> bool {
    true
}

/// Outcome counts of a consolidation batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationSummary {
    /// Records materialized as unified groups.
    pub migrated: usize,
    /// Fully-settled debts not recreated as zero-balance noise.
    pub skipped_settled: usize,
    /// Records already migrated by an earlier run.
    pub skipped_already: usize,
    /// Records skipped because they could not be mapped.
    pub failed: usize,
}

impl ConsolidationSummary {
    /// Total number of records examined.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.migrated + self.skipped_settled + self.skipped_already + self.failed
    }
}
