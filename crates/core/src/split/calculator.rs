//! Split calculation using the Largest Remainder Method.
//!
//! Turns (total amount, split strategy, participant set, strategy
//! parameters) into a per-participant owed-amount mapping. The mapping is
//! always materialized and persisted with the entry, so replay never
//! re-derives amounts from ambiguous inputs.
//!
//! The Largest Remainder Method works by:
//! 1. Calculate exact allocations
//! 2. Round down each allocation to the currency's minor unit
//! 3. Calculate the remainder (total - sum of rounded)
//! 4. Distribute remainder units to items with largest fractional parts

use divvy_shared::types::{Currency, ParticipantId};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::SplitError;

/// How an entry's amount was divided across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Equal shares across all active participants.
    Equal,
    /// Caller-supplied per-participant amounts.
    Custom,
    /// Caller-supplied percentages of the total.
    Percentage,
    /// Caller-supplied integer share weights.
    Shares,
    /// One non-payer participant owes the whole amount.
    Full,
}

/// A single materialized split: how much one participant owes for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The participant who owes this share.
    pub participant_id: ParticipantId,
    /// The owed amount, at the currency's minor-unit precision.
    pub amount: Decimal,
}

/// Split strategy with its caller-supplied parameters.
#[derive(Debug, Clone)]
pub enum SplitSpec {
    /// Divide equally across all active participants.
    Equal,
    /// Use the supplied per-participant amounts verbatim.
    Custom(Vec<(ParticipantId, Decimal)>),
    /// Divide by the supplied percentages (must sum to 100).
    Percentage(Vec<(ParticipantId, Decimal)>),
    /// Divide proportionally to the supplied positive integer weights.
    Shares(Vec<(ParticipantId, u32)>),
    /// The named debtor owes the whole amount (two-party shortcut).
    Full {
        /// The participant who owes everything.
        debtor: ParticipantId,
    },
}

impl SplitSpec {
    /// The persisted tag for this strategy.
    #[must_use]
    pub const fn split_type(&self) -> SplitType {
        match self {
            Self::Equal => SplitType::Equal,
            Self::Custom(_) => SplitType::Custom,
            Self::Percentage(_) => SplitType::Percentage,
            Self::Shares(_) => SplitType::Shares,
            Self::Full { .. } => SplitType::Full,
        }
    }
}

/// Pure split calculator. No side effects, no state.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Computes the materialized splits for an entry.
    ///
    /// `participants` is the group's active participant set in stable
    /// (insertion) order; remainder units from allocation go to the
    /// earliest participants, so `100.00 / 3 → [33.34, 33.33, 33.33]`.
    ///
    /// # Errors
    ///
    /// Returns `SplitError` if the amount is not positive, carries more
    /// precision than the currency supports, references a participant
    /// outside the active set, or the strategy parameters are inconsistent.
    pub fn compute_splits(
        amount: Decimal,
        payer: ParticipantId,
        spec: &SplitSpec,
        participants: &[ParticipantId],
        currency: Currency,
    ) -> Result<Vec<Split>, SplitError> {
        if amount <= Decimal::ZERO {
            return Err(SplitError::InvalidAmount);
        }
        if currency.round(amount) != amount {
            return Err(SplitError::PrecisionExceeded(amount));
        }
        if participants.is_empty() {
            return Err(SplitError::EmptyParticipants);
        }
        if !participants.contains(&payer) {
            return Err(SplitError::UnknownParticipant(payer));
        }

        match spec {
            SplitSpec::Equal => Ok(Self::equal(amount, participants, currency)),
            SplitSpec::Custom(pairs) => Self::custom(amount, pairs, participants, currency),
            SplitSpec::Percentage(pairs) => {
                Self::percentage(amount, pairs, participants, currency)
            }
            SplitSpec::Shares(pairs) => Self::shares(amount, pairs, participants, currency),
            SplitSpec::Full { debtor } => Self::full(amount, payer, *debtor, participants),
        }
    }

    /// Equal split: `amount / n`, earliest participants absorb the
    /// remainder units.
    fn equal(amount: Decimal, participants: &[ParticipantId], currency: Currency) -> Vec<Split> {
        let count = Decimal::from(participants.len() as u64);
        let exact: Vec<Decimal> = participants.iter().map(|_| amount / count).collect();
        let amounts = allocate(amount, &exact, currency);

        participants
            .iter()
            .zip(amounts)
            .map(|(&participant_id, amount)| Split {
                participant_id,
                amount,
            })
            .collect()
    }

    /// Custom split: validate the caller-supplied mapping.
    ///
    /// All amounts are at minor-unit precision, so any discrepancy from the
    /// total is at least one minor unit and the sum check can be exact.
    fn custom(
        amount: Decimal,
        pairs: &[(ParticipantId, Decimal)],
        participants: &[ParticipantId],
        currency: Currency,
    ) -> Result<Vec<Split>, SplitError> {
        validate_members(pairs.iter().map(|(id, _)| *id), participants)?;

        for &(participant, value) in pairs {
            if value.is_sign_negative() {
                return Err(SplitError::NegativeSplit {
                    participant,
                    amount: value,
                });
            }
            if currency.round(value) != value {
                return Err(SplitError::PrecisionExceeded(value));
            }
        }

        let split_total: Decimal = pairs.iter().map(|(_, value)| *value).sum();
        if split_total != amount {
            return Err(SplitError::SplitMismatch {
                amount,
                split_total,
            });
        }

        Ok(pairs
            .iter()
            .map(|&(participant_id, amount)| Split {
                participant_id,
                amount,
            })
            .collect())
    }

    /// Percentage split: percentages must sum to 100 within 0.01.
    fn percentage(
        amount: Decimal,
        pairs: &[(ParticipantId, Decimal)],
        participants: &[ParticipantId],
        currency: Currency,
    ) -> Result<Vec<Split>, SplitError> {
        validate_members(pairs.iter().map(|(id, _)| *id), participants)?;

        for &(participant, pct) in pairs {
            if pct.is_sign_negative() {
                return Err(SplitError::NegativeSplit {
                    participant,
                    amount: pct,
                });
            }
        }

        let pct_total: Decimal = pairs.iter().map(|(_, pct)| *pct).sum();
        let tolerance = Decimal::new(1, 2);
        if (pct_total - Decimal::ONE_HUNDRED).abs() > tolerance {
            return Err(SplitError::InvalidPercentageTotal(pct_total));
        }

        // Normalize by the actual percentage total so the exact amounts sum
        // to the entry amount even at the edge of the tolerance.
        let exact: Vec<Decimal> = pairs
            .iter()
            .map(|(_, pct)| amount * *pct / pct_total)
            .collect();
        let amounts = allocate(amount, &exact, currency);

        Ok(pairs
            .iter()
            .zip(amounts)
            .map(|(&(participant_id, _), amount)| Split {
                participant_id,
                amount,
            })
            .collect())
    }

    /// Shares split: positive integer weights, proportional allocation.
    fn shares(
        amount: Decimal,
        pairs: &[(ParticipantId, u32)],
        participants: &[ParticipantId],
        currency: Currency,
    ) -> Result<Vec<Split>, SplitError> {
        validate_members(pairs.iter().map(|(id, _)| *id), participants)?;

        for &(participant, weight) in pairs {
            if weight == 0 {
                return Err(SplitError::ZeroWeight(participant));
            }
        }

        let weight_total: u64 = pairs.iter().map(|&(_, w)| u64::from(w)).sum();
        let weight_total = Decimal::from(weight_total);
        let exact: Vec<Decimal> = pairs
            .iter()
            .map(|&(_, w)| amount * Decimal::from(w) / weight_total)
            .collect();
        let amounts = allocate(amount, &exact, currency);

        Ok(pairs
            .iter()
            .zip(amounts)
            .map(|(&(participant_id, _), amount)| Split {
                participant_id,
                amount,
            })
            .collect())
    }

    /// Full split: the named debtor owes the entire amount.
    fn full(
        amount: Decimal,
        payer: ParticipantId,
        debtor: ParticipantId,
        participants: &[ParticipantId],
    ) -> Result<Vec<Split>, SplitError> {
        if participants.len() > 2 {
            return Err(SplitError::FullSplitTooManyParticipants(participants.len()));
        }
        if !participants.contains(&debtor) {
            return Err(SplitError::UnknownParticipant(debtor));
        }
        if debtor == payer {
            return Err(SplitError::FullSplitSelf);
        }

        Ok(vec![Split {
            participant_id: debtor,
            amount,
        }])
    }
}

/// Validates that the strategy's participants are active group members,
/// each appearing at most once.
fn validate_members(
    ids: impl Iterator<Item = ParticipantId>,
    participants: &[ParticipantId],
) -> Result<(), SplitError> {
    let mut seen = Vec::new();
    for id in ids {
        if !participants.contains(&id) {
            return Err(SplitError::UnknownParticipant(id));
        }
        if seen.contains(&id) {
            return Err(SplitError::DuplicateParticipant(id));
        }
        seen.push(id);
    }
    if seen.is_empty() {
        return Err(SplitError::EmptyParticipants);
    }
    Ok(())
}

/// Largest Remainder allocation: floors each exact amount to the currency's
/// minor unit, then hands the leftover units to the items with the largest
/// fractional remainders (stable, so earlier items win ties).
fn allocate(total: Decimal, exact: &[Decimal], currency: Currency) -> Vec<Decimal> {
    let decimal_places = currency.decimal_places();
    let unit = currency.unit();

    let mut rounded: Vec<Decimal> = exact
        .iter()
        .map(|a| a.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
        .collect();

    let allocated: Decimal = rounded.iter().copied().sum();
    let remainder = total - allocated;

    let units = (remainder / unit)
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_u64()
        .unwrap_or(0);
    let units = usize::try_from(units).unwrap_or(0);
    if units == 0 {
        return rounded;
    }

    // Sort indexes by fractional remainder (largest first); the sort is
    // stable so equal remainders keep participant insertion order.
    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| (exact[b] - rounded[b]).cmp(&(exact[a] - rounded[a])));

    for i in 0..units {
        rounded[order[i % order.len()]] += unit;
    }

    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn ids(n: usize) -> Vec<ParticipantId> {
        (0..n).map(|_| ParticipantId::new()).collect()
    }

    fn amounts(splits: &[Split]) -> Vec<Decimal> {
        splits.iter().map(|s| s.amount).collect()
    }

    // =========================================================================
    // Equal
    // =========================================================================

    #[test]
    fn test_equal_even_split() {
        let p = ids(2);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &SplitSpec::Equal, &p, Currency::Usd)
                .unwrap();
        assert_eq!(amounts(&splits), vec![dec!(50), dec!(50)]);
    }

    #[test]
    fn test_equal_thirds_first_absorbs_remainder() {
        let p = ids(3);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &SplitSpec::Equal, &p, Currency::Usd)
                .unwrap();
        assert_eq!(amounts(&splits), vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_equal_zero_decimal_currency() {
        let p = ids(3);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &SplitSpec::Equal, &p, Currency::Jpy)
                .unwrap();
        assert_eq!(amounts(&splits), vec![dec!(34), dec!(33), dec!(33)]);
    }

    #[rstest]
    #[case(dec!(100), 3)]
    #[case(dec!(100), 7)]
    #[case(dec!(0.05), 4)]
    #[case(dec!(999.99), 6)]
    #[case(dec!(1), 3)]
    fn test_equal_split_sum_invariant(#[case] amount: Decimal, #[case] count: usize) {
        let p = ids(count);
        let splits =
            SplitCalculator::compute_splits(amount, p[0], &SplitSpec::Equal, &p, Currency::Usd)
                .unwrap();
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), amount);
    }

    #[test]
    fn test_equal_single_participant() {
        let p = ids(1);
        let splits =
            SplitCalculator::compute_splits(dec!(25.50), p[0], &SplitSpec::Equal, &p, Currency::Usd)
                .unwrap();
        assert_eq!(amounts(&splits), vec![dec!(25.50)]);
    }

    // =========================================================================
    // Custom
    // =========================================================================

    #[test]
    fn test_custom_valid() {
        let p = ids(3);
        let spec = SplitSpec::Custom(vec![
            (p[0], dec!(10.00)),
            (p[1], dec!(60.00)),
            (p[2], dec!(30.00)),
        ]);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(amounts(&splits), vec![dec!(10.00), dec!(60.00), dec!(30.00)]);
    }

    #[test]
    fn test_custom_sum_mismatch() {
        let p = ids(2);
        let spec = SplitSpec::Custom(vec![(p[0], dec!(10.00)), (p[1], dec!(50.00))]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::SplitMismatch { .. })));
    }

    #[test]
    fn test_custom_unknown_participant() {
        let p = ids(2);
        let outsider = ParticipantId::new();
        let spec = SplitSpec::Custom(vec![(p[0], dec!(50.00)), (outsider, dec!(50.00))]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::UnknownParticipant(id)) if id == outsider));
    }

    #[test]
    fn test_custom_duplicate_participant() {
        let p = ids(2);
        let spec = SplitSpec::Custom(vec![(p[0], dec!(50.00)), (p[0], dec!(50.00))]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::DuplicateParticipant(_))));
    }

    #[test]
    fn test_custom_negative_split() {
        let p = ids(2);
        let spec = SplitSpec::Custom(vec![(p[0], dec!(-10.00)), (p[1], dec!(110.00))]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::NegativeSplit { .. })));
    }

    // =========================================================================
    // Percentage
    // =========================================================================

    #[test]
    fn test_percentage_uneven() {
        let p = ids(3);
        let spec = SplitSpec::Percentage(vec![
            (p[0], dec!(50)),
            (p[1], dec!(30)),
            (p[2], dec!(20)),
        ]);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(amounts(&splits), vec![dec!(50), dec!(30), dec!(20)]);
    }

    #[test]
    fn test_percentage_thirds_sum_exact() {
        let p = ids(3);
        let spec = SplitSpec::Percentage(vec![
            (p[0], dec!(33.33)),
            (p[1], dec!(33.33)),
            (p[2], dec!(33.34)),
        ]);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_percentage_bad_total() {
        let p = ids(2);
        let spec = SplitSpec::Percentage(vec![(p[0], dec!(50)), (p[1], dec!(30))]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(
            result,
            Err(SplitError::InvalidPercentageTotal(total)) if total == dec!(80)
        ));
    }

    // =========================================================================
    // Shares
    // =========================================================================

    #[test]
    fn test_shares_proportional() {
        let p = ids(3);
        let spec = SplitSpec::Shares(vec![(p[0], 2), (p[1], 1), (p[2], 1)]);
        let splits =
            SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(amounts(&splits), vec![dec!(50), dec!(25), dec!(25)]);
    }

    #[test]
    fn test_shares_remainder_correction() {
        let p = ids(3);
        let spec = SplitSpec::Shares(vec![(p[0], 1), (p[1], 1), (p[2], 1)]);
        let splits =
            SplitCalculator::compute_splits(dec!(0.01), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Decimal>(), dec!(0.01));
    }

    #[test]
    fn test_shares_zero_weight() {
        let p = ids(2);
        let spec = SplitSpec::Shares(vec![(p[0], 0), (p[1], 1)]);
        let result = SplitCalculator::compute_splits(dec!(100), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::ZeroWeight(_))));
    }

    // =========================================================================
    // Full
    // =========================================================================

    #[test]
    fn test_full_two_party() {
        let p = ids(2);
        let spec = SplitSpec::Full { debtor: p[1] };
        let splits =
            SplitCalculator::compute_splits(dec!(50), p[0], &spec, &p, Currency::Usd).unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].participant_id, p[1]);
        assert_eq!(splits[0].amount, dec!(50));
    }

    #[test]
    fn test_full_rejects_three_party_group() {
        let p = ids(3);
        let spec = SplitSpec::Full { debtor: p[1] };
        let result = SplitCalculator::compute_splits(dec!(50), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(
            result,
            Err(SplitError::FullSplitTooManyParticipants(3))
        ));
    }

    #[test]
    fn test_full_rejects_self() {
        let p = ids(2);
        let spec = SplitSpec::Full { debtor: p[0] };
        let result = SplitCalculator::compute_splits(dec!(50), p[0], &spec, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::FullSplitSelf)));
    }

    // =========================================================================
    // Common validation
    // =========================================================================

    #[test]
    fn test_rejects_zero_amount() {
        let p = ids(2);
        let result =
            SplitCalculator::compute_splits(dec!(0), p[0], &SplitSpec::Equal, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::InvalidAmount)));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let p = ids(2);
        let result =
            SplitCalculator::compute_splits(dec!(-10), p[0], &SplitSpec::Equal, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::InvalidAmount)));
    }

    #[test]
    fn test_rejects_sub_unit_precision() {
        let p = ids(2);
        let result = SplitCalculator::compute_splits(
            dec!(10.005),
            p[0],
            &SplitSpec::Equal,
            &p,
            Currency::Usd,
        );
        assert!(matches!(result, Err(SplitError::PrecisionExceeded(_))));
    }

    #[test]
    fn test_rejects_payer_outside_group() {
        let p = ids(2);
        let outsider = ParticipantId::new();
        let result =
            SplitCalculator::compute_splits(dec!(10), outsider, &SplitSpec::Equal, &p, Currency::Usd);
        assert!(matches!(result, Err(SplitError::UnknownParticipant(id)) if id == outsider));
    }

    #[test]
    fn test_rejects_empty_participants() {
        let result = SplitCalculator::compute_splits(
            dec!(10),
            ParticipantId::new(),
            &SplitSpec::Equal,
            &[],
            Currency::Usd,
        );
        assert!(matches!(result, Err(SplitError::EmptyParticipants)));
    }
}
