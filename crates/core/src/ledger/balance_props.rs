//! Property-based tests for the balance engine.
//!
//! These drive random operation sequences through the incremental engine
//! and use `recompute` as the correctness oracle.

use chrono::{NaiveDate, TimeZone, Utc};
use divvy_shared::types::{Currency, EntryId, GroupId, ParticipantId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceEngine, BalanceMap};
use super::entry::LedgerEntry;
use crate::split::{SplitCalculator, SplitSpec, SplitType};

/// One step of a random operation sequence.
#[derive(Debug, Clone)]
enum Op {
    /// Expense paid by participant index, equal split, amount in cents.
    Expense { payer: usize, cents: i64 },
    /// Settlement from one participant index to another, amount in cents.
    Settle { from: usize, to: usize, cents: i64 },
    /// Soft-delete the n-th surviving entry (modulo count).
    Delete { nth: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, 1i64..1_000_000).prop_map(|(payer, cents)| Op::Expense { payer, cents }),
        (0usize..8, 0usize..8, 1i64..1_000_000)
            .prop_map(|(from, to, cents)| Op::Settle { from, to, cents }),
        (0usize..16).prop_map(|nth| Op::Delete { nth }),
    ]
}

fn make_expense(
    group_id: GroupId,
    participants: &[ParticipantId],
    payer: ParticipantId,
    amount: Decimal,
    seq: u32,
) -> LedgerEntry {
    let splits =
        SplitCalculator::compute_splits(amount, payer, &SplitSpec::Equal, participants, Currency::Usd)
            .unwrap();
    LedgerEntry {
        id: EntryId::new(),
        group_id,
        description: format!("expense {seq}"),
        amount,
        currency: Currency::Usd,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        paid_by: payer,
        split_type: SplitType::Equal,
        splits,
        category_id: None,
        notes: None,
        is_settlement: false,
        deleted_at: None,
        created_by: UserId::new(),
        created_at: Utc.timestamp_opt(1_770_000_000 + i64::from(seq), 0).unwrap(),
    }
}

fn make_settlement(
    group_id: GroupId,
    from: ParticipantId,
    to: ParticipantId,
    amount: Decimal,
    seq: u32,
) -> LedgerEntry {
    LedgerEntry {
        id: EntryId::new(),
        group_id,
        description: format!("settlement {seq}"),
        amount,
        currency: Currency::Usd,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        paid_by: from,
        split_type: SplitType::Full,
        splits: vec![crate::split::Split {
            participant_id: to,
            amount,
        }],
        category_id: None,
        notes: None,
        is_settlement: true,
        deleted_at: None,
        created_by: UserId::new(),
        created_at: Utc.timestamp_opt(1_770_000_000 + i64::from(seq), 0).unwrap(),
    }
}

/// Runs an operation sequence through the incremental engine, returning the
/// balances and the full entry log (including soft-deleted entries).
fn run_sequence(
    group_id: GroupId,
    participants: &[ParticipantId],
    ops: &[Op],
) -> (BalanceMap, Vec<LedgerEntry>) {
    let mut balances: BalanceMap = participants
        .iter()
        .map(|&id| (id, Decimal::ZERO))
        .collect();
    let mut log: Vec<LedgerEntry> = Vec::new();

    for (seq, op) in ops.iter().enumerate() {
        let seq = u32::try_from(seq).unwrap();
        match *op {
            Op::Expense { payer, cents } => {
                let payer = participants[payer % participants.len()];
                let entry = make_expense(
                    group_id,
                    participants,
                    payer,
                    Decimal::new(cents, 2),
                    seq,
                );
                BalanceEngine::apply_entry(&mut balances, &entry).unwrap();
                log.push(entry);
            }
            Op::Settle { from, to, cents } => {
                let from = participants[from % participants.len()];
                let to = participants[to % participants.len()];
                if from == to {
                    continue;
                }
                let entry = make_settlement(group_id, from, to, Decimal::new(cents, 2), seq);
                BalanceEngine::apply_entry(&mut balances, &entry).unwrap();
                log.push(entry);
            }
            Op::Delete { nth } => {
                let live: Vec<usize> = log
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| !e.is_deleted())
                    .map(|(i, _)| i)
                    .collect();
                if live.is_empty() {
                    continue;
                }
                let idx = live[nth % live.len()];
                BalanceEngine::reverse_entry(&mut balances, &log[idx]).unwrap();
                log[idx].deleted_at = Some(Utc::now());
            }
        }
    }

    (balances, log)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// After any sequence of expenses, settlements, and soft-deletes, the
    /// group's balances sum to zero.
    #[test]
    fn prop_zero_sum_invariant(
        count in 2usize..6,
        ops in prop::collection::vec(op_strategy(), 1..30),
    ) {
        let group_id = GroupId::new();
        let participants: Vec<ParticipantId> =
            (0..count).map(|_| ParticipantId::new()).collect();

        let (balances, _) = run_sequence(group_id, &participants, &ops);

        let residual: Decimal = balances.values().copied().sum();
        prop_assert_eq!(residual, Decimal::ZERO);
    }

    /// Replaying the surviving log from zero yields exactly the balances
    /// the incremental engine maintained (no drift).
    #[test]
    fn prop_replay_equivalence(
        count in 2usize..6,
        ops in prop::collection::vec(op_strategy(), 1..30),
    ) {
        let group_id = GroupId::new();
        let participants: Vec<ParticipantId> =
            (0..count).map(|_| ParticipantId::new()).collect();

        let (incremental, log) = run_sequence(group_id, &participants, &ops);
        let replayed = BalanceEngine::recompute(&participants, &log).unwrap();

        prop_assert_eq!(incremental, replayed);
    }

    /// Reversal is the exact inverse of application: apply-then-reverse
    /// restores every participant's balance.
    #[test]
    fn prop_reversal_restores_balances(
        count in 2usize..6,
        setup in prop::collection::vec(op_strategy(), 0..10),
        payer in 0usize..6,
        cents in 1i64..1_000_000,
    ) {
        let group_id = GroupId::new();
        let participants: Vec<ParticipantId> =
            (0..count).map(|_| ParticipantId::new()).collect();

        let (mut balances, _) = run_sequence(group_id, &participants, &setup);
        let before = balances.clone();

        let entry = make_expense(
            group_id,
            &participants,
            participants[payer % participants.len()],
            Decimal::new(cents, 2),
            9999,
        );
        BalanceEngine::apply_entry(&mut balances, &entry).unwrap();
        BalanceEngine::reverse_entry(&mut balances, &entry).unwrap();

        prop_assert_eq!(balances, before);
    }
}
