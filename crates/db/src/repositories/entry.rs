//! Entry repository: the ledger entry store.
//!
//! Creating, settling, and soft-deleting entries all follow the same
//! transactional shape: exclusively lock the group's participant rows,
//! validate, persist the entry row, apply the balance deltas, re-check the
//! zero-sum invariant, commit. A crash between "entry written" and
//! "balances updated" therefore cannot occur.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use divvy_core::group::GroupError;
use divvy_core::ledger::balance::{BalanceEngine, BalanceMap};
use divvy_core::ledger::entry::{EntryDraft, LedgerEntry};
use divvy_core::ledger::error::LedgerError;
use divvy_core::ledger::validation::validate_entry;
use divvy_core::settlement::{SettlementInput, SettlementRecorder};
use divvy_shared::types::{Currency, EntryId, GroupId, ParticipantId};
use divvy_shared::types::{PageRequest, PageResponse};

use super::group::{find_group_locked, lock_participants};
use super::{StoreError, convert};
use crate::entities::{entry_splits, ledger_entries, ledger_groups, participants};

/// Filter options for listing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Include soft-deleted entries (audit view).
    pub include_deleted: bool,
    /// Only settlements (`Some(true)`) or only expenses (`Some(false)`).
    pub settlements_only: Option<bool>,
    /// Earliest entry date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest entry date, inclusive.
    pub date_to: Option<NaiveDate>,
}

/// Entry repository: persistence boundary for ledger entries.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: DatabaseConnection,
}

impl EntryRepository {
    /// Creates a new entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a new expense entry: resolves the splits, persists the
    /// entry, and applies the balance deltas atomically.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input, `ConcurrencyConflict` on
    /// lock contention, and consistency defects if the invariant breaks.
    pub async fn create_entry(&self, draft: EntryDraft) -> Result<LedgerEntry, StoreError> {
        let group_id = draft.group_id;
        let txn = self.db.begin().await?;

        let group_model = find_group_locked(&txn, group_id).await?;
        if !group_model.is_active {
            return Err(StoreError::Group(GroupError::GroupInactive));
        }
        let currency = convert::currency_from_str(group_model.currency.trim())?;

        let participant_models = lock_participants(&txn, group_id).await?;
        let active_ids: Vec<ParticipantId> = participant_models
            .iter()
            .filter(|p| p.is_active)
            .map(|p| ParticipantId::from_uuid(p.id))
            .collect();

        let entry = LedgerEntry::from_draft(draft, &active_ids, currency, Utc::now())?;

        self.apply_and_persist(&txn, &entry, &participant_models, &active_ids, currency)
            .await?;

        txn.commit().await?;
        info!(entry_id = %entry.id, %group_id, amount = %entry.amount, "Created entry");
        Ok(entry)
    }

    /// Records a settlement between two participants.
    ///
    /// The settled amount need not equal any prior computed debt; over-
    /// and underpayment simply shift the balance.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input, `ConcurrencyConflict` on
    /// lock contention, and consistency defects if the invariant breaks.
    pub async fn record_settlement(
        &self,
        input: SettlementInput,
    ) -> Result<LedgerEntry, StoreError> {
        let group_id = input.group_id;
        let txn = self.db.begin().await?;

        let group_model = find_group_locked(&txn, group_id).await?;
        if !group_model.is_active {
            return Err(StoreError::Group(GroupError::GroupInactive));
        }
        let currency = convert::currency_from_str(group_model.currency.trim())?;

        let participant_models = lock_participants(&txn, group_id).await?;
        let active_ids: Vec<ParticipantId> = participant_models
            .iter()
            .filter(|p| p.is_active)
            .map(|p| ParticipantId::from_uuid(p.id))
            .collect();

        let entry = SettlementRecorder::build_entry(input, currency, Utc::now())?;

        self.apply_and_persist(&txn, &entry, &participant_models, &active_ids, currency)
            .await?;

        txn.commit().await?;
        info!(entry_id = %entry.id, %group_id, amount = %entry.amount, "Recorded settlement");
        Ok(entry)
    }

    /// Soft-deletes an entry and reverses its balance deltas in the same
    /// transaction. The row is kept for the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `EntryAlreadyDeleted`, or consistency
    /// defects if the invariant breaks.
    pub async fn soft_delete_entry(&self, entry_id: EntryId) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        let entry_model = ledger_entries::Entity::find_by_id(entry_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(StoreError::EntryNotFound(entry_id.into_inner()))?;
        if entry_model.deleted_at.is_some() {
            return Err(StoreError::Ledger(LedgerError::EntryAlreadyDeleted(
                entry_id,
            )));
        }
        let group_id = GroupId::from_uuid(entry_model.group_id);

        let participant_models = lock_participants(&txn, group_id).await?;

        let split_models = entry_splits::Entity::find()
            .filter(entry_splits::Column::EntryId.eq(entry_id.into_inner()))
            .all(&txn)
            .await?;
        let entry = convert::entry_from_models(&entry_model, &split_models)?;

        let mut active: ledger_entries::ActiveModel = entry_model.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let mut balances = balance_map(&participant_models);
        if let Err(err) = BalanceEngine::reverse_entry(&mut balances, &entry) {
            error!(
                %group_id,
                %entry_id,
                entry = ?entry,
                error = %err,
                "Balance invariant violated while reversing entry; aborting transaction"
            );
            return Err(err.into());
        }
        update_balances(&txn, &entry, &balances).await?;

        txn.commit().await?;
        info!(%entry_id, %group_id, "Soft-deleted entry and reversed balances");
        Ok(())
    }

    /// Fetches one entry (including soft-deleted ones) with its splits.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist.
    pub async fn get_entry(&self, entry_id: EntryId) -> Result<LedgerEntry, StoreError> {
        let entry_model = ledger_entries::Entity::find_by_id(entry_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(StoreError::EntryNotFound(entry_id.into_inner()))?;

        let split_models = entry_splits::Entity::find()
            .filter(entry_splits::Column::EntryId.eq(entry_id.into_inner()))
            .all(&self.db)
            .await?;

        convert::entry_from_models(&entry_model, &split_models)
    }

    /// Lists a group's entries, newest first. Soft-deleted entries are
    /// excluded unless the filter's audit flag is set.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the group does not exist.
    pub async fn list_entries(
        &self,
        group_id: GroupId,
        filter: &EntryFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerEntry>, StoreError> {
        let exists = ledger_groups::Entity::find_by_id(group_id.into_inner())
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(StoreError::GroupNotFound(group_id.into_inner()));
        }

        let query = filtered_query(group_id, filter);
        let total = query.clone().count(&self.db).await?;

        let entry_models = query
            .order_by_desc(ledger_entries::Column::EntryDate)
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let entry_ids: Vec<Uuid> = entry_models.iter().map(|e| e.id).collect();
        let split_models = entry_splits::Entity::find()
            .filter(entry_splits::Column::EntryId.is_in(entry_ids))
            .all(&self.db)
            .await?;

        let mut splits_by_entry: HashMap<Uuid, Vec<entry_splits::Model>> = HashMap::new();
        for split in split_models {
            splits_by_entry.entry(split.entry_id).or_default().push(split);
        }

        let mut entries = Vec::with_capacity(entry_models.len());
        for model in &entry_models {
            let splits = splits_by_entry.remove(&model.id).unwrap_or_default();
            entries.push(convert::entry_from_models(model, &splits)?);
        }

        Ok(PageResponse::new(entries, page.page, page.per_page, total))
    }

    /// Replays the group's full non-deleted history from zero and
    /// overwrites the stored balances.
    ///
    /// This is the consistency-repair operation; drift between the cached
    /// and replayed balances is logged before being corrected.
    ///
    /// # Errors
    ///
    /// Returns consistency defects if the replayed history itself violates
    /// the invariant.
    pub async fn recompute_group_balances(
        &self,
        group_id: GroupId,
    ) -> Result<BalanceMap, StoreError> {
        let txn = self.db.begin().await?;

        find_group_locked(&txn, group_id).await?;
        let participant_models = lock_participants(&txn, group_id).await?;
        let participant_ids: Vec<ParticipantId> = participant_models
            .iter()
            .map(|p| ParticipantId::from_uuid(p.id))
            .collect();

        let entry_models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(group_id.into_inner()))
            .filter(ledger_entries::Column::DeletedAt.is_null())
            .all(&txn)
            .await?;

        let entry_ids: Vec<Uuid> = entry_models.iter().map(|e| e.id).collect();
        let split_models = entry_splits::Entity::find()
            .filter(entry_splits::Column::EntryId.is_in(entry_ids))
            .all(&txn)
            .await?;
        let mut splits_by_entry: HashMap<Uuid, Vec<entry_splits::Model>> = HashMap::new();
        for split in split_models {
            splits_by_entry.entry(split.entry_id).or_default().push(split);
        }

        let mut entries = Vec::with_capacity(entry_models.len());
        for model in &entry_models {
            let splits = splits_by_entry.remove(&model.id).unwrap_or_default();
            entries.push(convert::entry_from_models(model, &splits)?);
        }

        let replayed = BalanceEngine::recompute(&participant_ids, &entries)?;

        for model in &participant_models {
            let participant_id = ParticipantId::from_uuid(model.id);
            let new_balance = replayed[&participant_id];
            if model.balance != new_balance {
                warn!(
                    %group_id,
                    %participant_id,
                    cached = %model.balance,
                    replayed = %new_balance,
                    "Balance drift repaired by recompute"
                );
            }
            let update = participants::ActiveModel {
                id: Set(model.id),
                balance: Set(new_balance),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            };
            update.update(&txn).await?;
        }

        txn.commit().await?;
        info!(%group_id, entries = entries.len(), "Recomputed group balances");
        Ok(replayed)
    }

    /// Shared write path: validate, apply deltas against the locked
    /// balances, persist the entry and its splits, store the new balances.
    async fn apply_and_persist(
        &self,
        txn: &DatabaseTransaction,
        entry: &LedgerEntry,
        participant_models: &[participants::Model],
        active_ids: &[ParticipantId],
        currency: Currency,
    ) -> Result<(), StoreError> {
        validate_entry(entry, currency, |id| active_ids.contains(&id))?;

        let mut balances = balance_map(participant_models);
        if let Err(err) = BalanceEngine::apply_entry(&mut balances, entry) {
            error!(
                group_id = %entry.group_id,
                entry_id = %entry.id,
                entry = ?entry,
                error = %err,
                "Balance invariant violated while applying entry; aborting transaction"
            );
            return Err(err.into());
        }

        convert::entry_active(entry).insert(txn).await?;
        for split in &entry.splits {
            convert::split_active(entry.id, split).insert(txn).await?;
        }

        update_balances(txn, entry, &balances).await?;
        Ok(())
    }
}

/// Builds the in-memory balance map from the locked participant rows.
fn balance_map(participant_models: &[participants::Model]) -> BalanceMap {
    participant_models
        .iter()
        .map(|p| (ParticipantId::from_uuid(p.id), p.balance))
        .collect()
}

/// Writes the post-application balances of every participant the entry
/// touched.
async fn update_balances(
    txn: &DatabaseTransaction,
    entry: &LedgerEntry,
    balances: &BalanceMap,
) -> Result<(), StoreError> {
    for (participant_id, _) in BalanceEngine::entry_deltas(entry) {
        let update = participants::ActiveModel {
            id: Set(participant_id.into_inner()),
            balance: Set(balances[&participant_id]),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        update.update(txn).await?;
    }
    Ok(())
}

/// Applies the list filter to a fresh select.
fn filtered_query(group_id: GroupId, filter: &EntryFilter) -> Select<ledger_entries::Entity> {
    let mut query = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::GroupId.eq(group_id.into_inner()));

    if !filter.include_deleted {
        query = query.filter(ledger_entries::Column::DeletedAt.is_null());
    }
    if let Some(settlements_only) = filter.settlements_only {
        query = query.filter(ledger_entries::Column::IsSettlement.eq(settlements_only));
    }
    if let Some(date_from) = filter.date_from {
        query = query.filter(ledger_entries::Column::EntryDate.gte(date_from));
    }
    if let Some(date_to) = filter.date_to {
        query = query.filter(ledger_entries::Column::EntryDate.lte(date_to));
    }

    query
}
