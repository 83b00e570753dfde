//! The balance engine: participant balance maintenance.
//!
//! Balances are signed running totals per participant: positive means "is
//! owed money by the group", negative means "owes the group". The entry log
//! is the source of truth and stored balances are a cache; `recompute` is
//! the authoritative repair operation and the correctness oracle in tests.
//!
//! All balance mutation in the system goes through `apply_entry` and
//! `reverse_entry`; no other code path touches balances.

use std::collections::BTreeMap;

use divvy_shared::types::ParticipantId;
use rust_decimal::Decimal;

use super::entry::LedgerEntry;
use super::error::LedgerError;

/// Participant balances of one group.
///
/// The map must cover the group's full participant set; the zero-sum check
/// sums every value in the map.
pub type BalanceMap = BTreeMap<ParticipantId, Decimal>;

/// Stateless balance engine.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Computes the signed balance deltas an entry applies.
    ///
    /// The payer gains the full amount, every split participant loses their
    /// owed share; the payer's own share nets out in the same pass. A
    /// settlement (single counterpart split) is the same arithmetic: the
    /// payer's balance rises by the amount, the counterpart's falls.
    ///
    /// The deltas of a valid entry always sum to zero, because the splits
    /// sum to the amount.
    #[must_use]
    pub fn entry_deltas(entry: &LedgerEntry) -> Vec<(ParticipantId, Decimal)> {
        let mut deltas: BTreeMap<ParticipantId, Decimal> = BTreeMap::new();

        *deltas.entry(entry.paid_by).or_default() += entry.amount;
        for split in &entry.splits {
            *deltas.entry(split.participant_id).or_default() -= split.amount;
        }

        deltas.into_iter().collect()
    }

    /// Applies an entry to the group's balances.
    ///
    /// # Errors
    ///
    /// Returns `BalanceInvariantViolated` if the balances no longer sum to
    /// zero afterwards. That is an internal consistency defect and must
    /// abort the enclosing transaction.
    pub fn apply_entry(balances: &mut BalanceMap, entry: &LedgerEntry) -> Result<(), LedgerError> {
        for (participant_id, delta) in Self::entry_deltas(entry) {
            *balances.entry(participant_id).or_default() += delta;
        }
        Self::check_zero_sum(balances, entry)
    }

    /// Applies the exact negation of an entry.
    ///
    /// Used when an entry is soft-deleted or edited; edits are modeled as
    /// reverse-then-reapply, never as in-place balance patches.
    ///
    /// # Errors
    ///
    /// Returns `BalanceInvariantViolated` if the balances no longer sum to
    /// zero afterwards.
    pub fn reverse_entry(
        balances: &mut BalanceMap,
        entry: &LedgerEntry,
    ) -> Result<(), LedgerError> {
        for (participant_id, delta) in Self::entry_deltas(entry) {
            *balances.entry(participant_id).or_default() -= delta;
        }
        Self::check_zero_sum(balances, entry)
    }

    /// Replays every non-deleted entry from a zero baseline.
    ///
    /// Entries are replayed in ascending (entry date, created at, id)
    /// order. `participants` seeds the result so members without entries
    /// still appear with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `BalanceInvariantViolated` if any intermediate state breaks
    /// the zero-sum invariant.
    pub fn recompute(
        participants: &[ParticipantId],
        entries: &[LedgerEntry],
    ) -> Result<BalanceMap, LedgerError> {
        let mut balances: BalanceMap = participants
            .iter()
            .map(|&id| (id, Decimal::ZERO))
            .collect();

        let mut ordered: Vec<&LedgerEntry> =
            entries.iter().filter(|e| !e.is_deleted()).collect();
        ordered.sort_by_key(|e| (e.entry_date, e.created_at, e.id));

        for entry in ordered {
            Self::apply_entry(&mut balances, entry)?;
        }

        Ok(balances)
    }

    /// Postcondition check: the group's balances sum to zero.
    fn check_zero_sum(balances: &BalanceMap, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let residual: Decimal = balances.values().copied().sum();
        if residual.is_zero() {
            Ok(())
        } else {
            Err(LedgerError::BalanceInvariantViolated {
                group_id: entry.group_id,
                residual,
            })
        }
    }
}
