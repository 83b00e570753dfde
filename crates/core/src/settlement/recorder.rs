//! Builds settlement entries.
//!
//! A settlement records a payment between two participants without
//! representing a new expense: the payer's balance rises by the amount, the
//! counterpart's falls. It reuses the balance engine's ordinary entry
//! arithmetic through a single counterpart split.

use chrono::{DateTime, NaiveDate, Utc};
use divvy_shared::types::{Currency, GroupId, ParticipantId, UserId};
use rust_decimal::Decimal;

use crate::ledger::entry::LedgerEntry;
use crate::ledger::error::LedgerError;
use crate::split::{Split, SplitType};

/// Input for recording a settlement.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    /// The group the settlement belongs to.
    pub group_id: GroupId,
    /// The participant who paid.
    pub from: ParticipantId,
    /// The participant who was paid.
    pub to: ParticipantId,
    /// The settled amount. Need not equal any prior computed debt;
    /// over- and underpayment simply shift the balance.
    pub amount: Decimal,
    /// The date the payment happened.
    pub entry_date: NaiveDate,
    /// Optional description; defaults to "Settlement".
    pub description: Option<String>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// The user recording the settlement.
    pub recorded_by: UserId,
}

/// Stateless settlement entry builder.
pub struct SettlementRecorder;

impl SettlementRecorder {
    /// Builds the settlement entry for persistence and balance application.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the amount is not positive, exceeds the
    /// currency's precision, or the payer and counterpart are the same
    /// participant.
    pub fn build_entry(
        input: SettlementInput,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if currency.round(input.amount) != input.amount {
            return Err(LedgerError::PrecisionExceeded(input.amount));
        }
        if input.from == input.to {
            return Err(LedgerError::SettlementSelf);
        }

        Ok(LedgerEntry {
            id: divvy_shared::types::EntryId::new(),
            group_id: input.group_id,
            description: input
                .description
                .unwrap_or_else(|| "Settlement".to_string()),
            amount: input.amount,
            currency,
            entry_date: input.entry_date,
            paid_by: input.from,
            split_type: SplitType::Full,
            splits: vec![Split {
                participant_id: input.to,
                amount: input.amount,
            }],
            category_id: None,
            notes: input.notes,
            is_settlement: true,
            deleted_at: None,
            created_by: input.recorded_by,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::balance::{BalanceEngine, BalanceMap};
    use rust_decimal_macros::dec;

    fn input(from: ParticipantId, to: ParticipantId, amount: Decimal) -> SettlementInput {
        SettlementInput {
            group_id: GroupId::new(),
            from,
            to,
            amount,
            entry_date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            description: None,
            notes: None,
            recorded_by: UserId::new(),
        }
    }

    #[test]
    fn test_builds_single_counterpart_split() {
        let from = ParticipantId::new();
        let to = ParticipantId::new();
        let entry =
            SettlementRecorder::build_entry(input(from, to, dec!(50.00)), Currency::Usd, Utc::now())
                .unwrap();

        assert!(entry.is_settlement);
        assert_eq!(entry.paid_by, from);
        assert_eq!(entry.splits.len(), 1);
        assert_eq!(entry.splits[0].participant_id, to);
        assert_eq!(entry.splits[0].amount, dec!(50.00));
        assert_eq!(entry.description, "Settlement");
    }

    #[test]
    fn test_settlement_transfers_balance() {
        let from = ParticipantId::new();
        let to = ParticipantId::new();
        let entry =
            SettlementRecorder::build_entry(input(from, to, dec!(25.00)), Currency::Usd, Utc::now())
                .unwrap();

        let mut balances: BalanceMap = [(from, dec!(-25.00)), (to, dec!(25.00))].into();
        BalanceEngine::apply_entry(&mut balances, &entry).unwrap();

        assert_eq!(balances[&from], dec!(0.00));
        assert_eq!(balances[&to], dec!(0.00));
    }

    #[test]
    fn test_rejects_self_settlement() {
        let p = ParticipantId::new();
        let result =
            SettlementRecorder::build_entry(input(p, p, dec!(10.00)), Currency::Usd, Utc::now());
        assert!(matches!(result, Err(LedgerError::SettlementSelf)));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let from = ParticipantId::new();
        let to = ParticipantId::new();
        let result =
            SettlementRecorder::build_entry(input(from, to, dec!(0)), Currency::Usd, Utc::now());
        assert!(matches!(result, Err(LedgerError::InvalidAmount)));
    }

    #[test]
    fn test_rejects_sub_unit_precision() {
        let from = ParticipantId::new();
        let to = ParticipantId::new();
        let result = SettlementRecorder::build_entry(
            input(from, to, dec!(10.005)),
            Currency::Usd,
            Utc::now(),
        );
        assert!(matches!(result, Err(LedgerError::PrecisionExceeded(_))));
    }
}
