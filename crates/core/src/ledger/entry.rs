//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use divvy_shared::types::{CategoryId, Currency, EntryId, GroupId, ParticipantId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::split::{Split, SplitCalculator, SplitSpec, SplitType};

/// A recorded transaction or settlement affecting participant balances.
///
/// The `splits` mapping is always materialized, even when computed from a
/// simpler strategy, so replaying history never re-derives amounts from
/// ambiguous inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,
    /// The group this entry belongs to.
    pub group_id: GroupId,
    /// Human-readable description.
    pub description: String,
    /// The total amount (always positive).
    pub amount: Decimal,
    /// The group's currency.
    pub currency: Currency,
    /// The date the expense or settlement happened.
    pub entry_date: NaiveDate,
    /// The participant who paid.
    pub paid_by: ParticipantId,
    /// The strategy the splits were computed with.
    pub split_type: SplitType,
    /// Materialized per-participant owed amounts.
    pub splits: Vec<Split>,
    /// Optional expense category (validated for shape only; existence
    /// checks belong to the category subsystem).
    pub category_id: Option<CategoryId>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// True for settlement entries (a payment between participants, not a
    /// new expense).
    pub is_settlement: bool,
    /// Soft-delete timestamp; set entries are excluded from balances.
    pub deleted_at: Option<DateTime<Utc>>,
    /// The user who recorded the entry.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns true if the entry has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Resolves a draft into a full entry by running the split calculator.
    ///
    /// `participants` is the group's active participant set in insertion
    /// order; `currency` is the group's currency.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Split` if the strategy parameters are invalid
    /// for the given participant set.
    pub fn from_draft(
        draft: EntryDraft,
        participants: &[ParticipantId],
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let splits = SplitCalculator::compute_splits(
            draft.amount,
            draft.paid_by,
            &draft.spec,
            participants,
            currency,
        )?;

        Ok(Self {
            id: EntryId::new(),
            group_id: draft.group_id,
            description: draft.description,
            amount: draft.amount,
            currency,
            entry_date: draft.entry_date,
            paid_by: draft.paid_by,
            split_type: draft.spec.split_type(),
            splits,
            category_id: draft.category_id,
            notes: draft.notes,
            is_settlement: false,
            deleted_at: None,
            created_by: draft.created_by,
            created_at: now,
        })
    }
}

/// Input for recording a new expense entry.
///
/// The splits are resolved by the calculator from `spec`; use
/// `SplitSpec::Custom` to supply a pre-computed mapping.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    /// The group to record into.
    pub group_id: GroupId,
    /// Human-readable description.
    pub description: String,
    /// The total amount (must be positive).
    pub amount: Decimal,
    /// The date the expense happened.
    pub entry_date: NaiveDate,
    /// The participant who paid.
    pub paid_by: ParticipantId,
    /// The split strategy and its parameters.
    pub spec: SplitSpec,
    /// Optional expense category.
    pub category_id: Option<CategoryId>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// The user recording the entry.
    pub created_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(group_id: GroupId, paid_by: ParticipantId, spec: SplitSpec) -> EntryDraft {
        EntryDraft {
            group_id,
            description: "Groceries".to_string(),
            amount: dec!(100),
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            paid_by,
            spec,
            category_id: None,
            notes: None,
            created_by: UserId::new(),
        }
    }

    #[test]
    fn test_from_draft_materializes_splits() {
        let group_id = GroupId::new();
        let p: Vec<ParticipantId> = (0..3).map(|_| ParticipantId::new()).collect();
        let entry = LedgerEntry::from_draft(
            draft(group_id, p[0], SplitSpec::Equal),
            &p,
            Currency::Usd,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(entry.group_id, group_id);
        assert_eq!(entry.split_type, SplitType::Equal);
        assert_eq!(entry.splits.len(), 3);
        assert_eq!(
            entry.splits.iter().map(|s| s.amount).sum::<Decimal>(),
            dec!(100)
        );
        assert!(!entry.is_settlement);
        assert!(!entry.is_deleted());
    }

    #[test]
    fn test_from_draft_propagates_split_errors() {
        let p: Vec<ParticipantId> = (0..3).map(|_| ParticipantId::new()).collect();
        let result = LedgerEntry::from_draft(
            draft(GroupId::new(), p[0], SplitSpec::Full { debtor: p[1] }),
            &p,
            Currency::Usd,
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::Split(_))));
    }
}
