//! Property-based tests for split calculation.

use divvy_shared::types::{Currency, ParticipantId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{SplitCalculator, SplitSpec};

/// Strategy for a positive amount at 2-decimal precision (0.01 to 100,000.00).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a participant count.
fn count_strategy() -> impl Strategy<Value = usize> {
    1usize..12
}

fn participants(n: usize) -> Vec<ParticipantId> {
    (0..n).map(|_| ParticipantId::new()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any amount and participant count, equal splits sum exactly to
    /// the amount and no two shares differ by more than one minor unit.
    #[test]
    fn prop_equal_split_sum_exact(
        amount in amount_strategy(),
        count in count_strategy(),
    ) {
        let p = participants(count);
        let splits = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Equal, &p, Currency::Usd,
        ).unwrap();

        let total: Decimal = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount, "equal split must sum to the amount");

        let min = splits.iter().map(|s| s.amount).min().unwrap();
        let max = splits.iter().map(|s| s.amount).max().unwrap();
        prop_assert!(
            max - min <= Currency::Usd.unit(),
            "shares may differ by at most one minor unit, got {} vs {}",
            min,
            max
        );
    }

    /// Equal splits are deterministic: the same inputs always produce the
    /// same mapping.
    #[test]
    fn prop_equal_split_deterministic(
        amount in amount_strategy(),
        count in count_strategy(),
    ) {
        let p = participants(count);
        let a = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Equal, &p, Currency::Usd,
        ).unwrap();
        let b = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Equal, &p, Currency::Usd,
        ).unwrap();
        prop_assert_eq!(a, b);
    }

    /// For any positive weights, share splits sum exactly to the amount.
    #[test]
    fn prop_shares_sum_exact(
        amount in amount_strategy(),
        weights in prop::collection::vec(1u32..50, 1..10),
    ) {
        let p = participants(weights.len());
        let pairs: Vec<(ParticipantId, u32)> =
            p.iter().copied().zip(weights.iter().copied()).collect();
        let splits = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Shares(pairs), &p, Currency::Usd,
        ).unwrap();

        let total: Decimal = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount);
    }

    /// For any percentage partition of 100, percentage splits sum exactly
    /// to the amount.
    #[test]
    fn prop_percentage_sum_exact(
        amount in amount_strategy(),
        cuts in prop::collection::vec(1u32..100, 1..8),
    ) {
        // Build percentages that sum to exactly 100.
        let cut_total: u32 = cuts.iter().sum();
        let mut pcts: Vec<Decimal> = cuts
            .iter()
            .map(|&c| {
                (Decimal::from(c) * Decimal::ONE_HUNDRED / Decimal::from(cut_total))
                    .round_dp(2)
            })
            .collect();
        let assigned: Decimal = pcts.iter().copied().sum();
        pcts[0] += Decimal::ONE_HUNDRED - assigned;
        prop_assume!(!pcts[0].is_sign_negative());

        let p = participants(pcts.len());
        let pairs: Vec<(ParticipantId, Decimal)> =
            p.iter().copied().zip(pcts).collect();
        let splits = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Percentage(pairs), &p, Currency::Usd,
        ).unwrap();

        let total: Decimal = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount);
    }

    /// Zero-decimal currencies never produce fractional shares.
    #[test]
    fn prop_equal_split_integral_for_jpy(
        amount in (1i64..1_000_000i64).prop_map(Decimal::from),
        count in count_strategy(),
    ) {
        let p = participants(count);
        let splits = SplitCalculator::compute_splits(
            amount, p[0], &SplitSpec::Equal, &p, Currency::Jpy,
        ).unwrap();

        for split in &splits {
            prop_assert_eq!(split.amount, split.amount.trunc());
        }
        let total: Decimal = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount);
    }
}
