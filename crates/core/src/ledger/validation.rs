//! Business rule validation for ledger entries.
//!
//! Runs at the store boundary on fully-materialized entries, including
//! entries replayed from the legacy consolidation, so persisted history is
//! checked by the same rules as new writes.

use divvy_shared::types::{Currency, ParticipantId};
use rust_decimal::Decimal;

use super::entry::LedgerEntry;
use super::error::LedgerError;

/// Validates a materialized entry against its group.
///
/// `is_active_member` reports whether a participant id is an active member
/// of the entry's group; membership data stays behind the caller's seam.
///
/// # Errors
///
/// Returns a `LedgerError` describing the first violated rule.
pub fn validate_entry<F>(
    entry: &LedgerEntry,
    group_currency: Currency,
    is_active_member: F,
) -> Result<(), LedgerError>
where
    F: Fn(ParticipantId) -> bool,
{
    if entry.amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    if group_currency.round(entry.amount) != entry.amount {
        return Err(LedgerError::PrecisionExceeded(entry.amount));
    }
    if entry.currency != group_currency {
        return Err(LedgerError::CurrencyMismatch {
            entry: entry.currency.to_string(),
            group: group_currency.to_string(),
        });
    }
    if entry.splits.is_empty() {
        return Err(LedgerError::NoSplits);
    }

    if !is_active_member(entry.paid_by) {
        return Err(LedgerError::UnknownParticipant(entry.paid_by));
    }

    let mut seen: Vec<ParticipantId> = Vec::with_capacity(entry.splits.len());
    let mut split_total = Decimal::ZERO;
    for split in &entry.splits {
        if seen.contains(&split.participant_id) {
            return Err(LedgerError::DuplicateSplitParticipant(split.participant_id));
        }
        seen.push(split.participant_id);

        if split.amount.is_sign_negative() {
            return Err(LedgerError::SplitMismatch {
                amount: entry.amount,
                split_total: split.amount,
            });
        }
        if group_currency.round(split.amount) != split.amount {
            return Err(LedgerError::PrecisionExceeded(split.amount));
        }
        if !is_active_member(split.participant_id) {
            return Err(LedgerError::UnknownParticipant(split.participant_id));
        }
        split_total += split.amount;
    }

    // All amounts are at minor-unit precision, so any discrepancy is at
    // least one minor unit and the comparison can be exact.
    if split_total != entry.amount {
        return Err(LedgerError::SplitMismatch {
            amount: entry.amount,
            split_total,
        });
    }

    if entry.is_settlement {
        if entry.splits.len() != 1 {
            return Err(LedgerError::SettlementShape(entry.splits.len()));
        }
        if entry.splits[0].participant_id == entry.paid_by {
            return Err(LedgerError::SettlementSelf);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{Split, SplitType};
    use chrono::{NaiveDate, Utc};
    use divvy_shared::types::{EntryId, GroupId, UserId};
    use rust_decimal_macros::dec;

    fn make_entry(
        paid_by: ParticipantId,
        splits: Vec<Split>,
        amount: Decimal,
        is_settlement: bool,
    ) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(),
            group_id: GroupId::new(),
            description: "Dinner".to_string(),
            amount,
            currency: Currency::Usd,
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            paid_by,
            split_type: if is_settlement {
                SplitType::Full
            } else {
                SplitType::Custom
            },
            splits,
            category_id: None,
            notes: None,
            is_settlement,
            deleted_at: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_entry() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![
                Split {
                    participant_id: a,
                    amount: dec!(50),
                },
                Split {
                    participant_id: b,
                    amount: dec!(50),
                },
            ],
            dec!(100),
            false,
        );
        assert!(validate_entry(&entry, Currency::Usd, |_| true).is_ok());
    }

    #[test]
    fn test_split_sum_mismatch() {
        let a = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![Split {
                participant_id: a,
                amount: dec!(99.99),
            }],
            dec!(100),
            false,
        );
        assert!(matches!(
            validate_entry(&entry, Currency::Usd, |_| true),
            Err(LedgerError::SplitMismatch { .. })
        ));
    }

    #[test]
    fn test_inactive_member_rejected() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![Split {
                participant_id: b,
                amount: dec!(100),
            }],
            dec!(100),
            false,
        );
        let result = validate_entry(&entry, Currency::Usd, |id| id == a);
        assert!(matches!(result, Err(LedgerError::UnknownParticipant(id)) if id == b));
    }

    #[test]
    fn test_currency_mismatch() {
        let a = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![Split {
                participant_id: a,
                amount: dec!(100),
            }],
            dec!(100),
            false,
        );
        assert!(matches!(
            validate_entry(&entry, Currency::Eur, |_| true),
            Err(LedgerError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_settlement_must_have_single_counterpart() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let c = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![
                Split {
                    participant_id: b,
                    amount: dec!(50),
                },
                Split {
                    participant_id: c,
                    amount: dec!(50),
                },
            ],
            dec!(100),
            true,
        );
        assert!(matches!(
            validate_entry(&entry, Currency::Usd, |_| true),
            Err(LedgerError::SettlementShape(2))
        ));
    }

    #[test]
    fn test_settlement_cannot_pay_self() {
        let a = ParticipantId::new();
        let entry = make_entry(
            a,
            vec![Split {
                participant_id: a,
                amount: dec!(100),
            }],
            dec!(100),
            true,
        );
        assert!(matches!(
            validate_entry(&entry, Currency::Usd, |_| true),
            Err(LedgerError::SettlementSelf)
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let a = ParticipantId::new();
        let entry = make_entry(a, vec![], dec!(0), false);
        assert!(matches!(
            validate_entry(&entry, Currency::Usd, |_| true),
            Err(LedgerError::InvalidAmount)
        ));
    }
}
