//! Transactional runner for the legacy consolidation batch.
//!
//! Each legacy record migrates inside its own database transaction, so the
//! batch can be cancelled between records without leaving a half-migrated
//! group, and no locks are ever held across two groups. Runs are idempotent
//! by legacy-record id through the `legacy_migrations` table.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set, TransactionTrait};
use tracing::{info, warn};

use divvy_core::consolidation::{
    ConsolidationService, ConsolidationSummary, LegacyRecord, MigrationOutcome,
};
use divvy_shared::types::GroupId;

use super::{StoreError, convert};
use crate::entities::legacy_migrations;

/// Result of migrating one legacy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    /// The record was materialized as a unified group.
    Migrated(GroupId),
    /// A fully-settled debt; recorded as processed, no group created.
    SkippedSettled,
    /// An earlier run already processed this record.
    SkippedAlready,
}

/// Consolidation repository: persists mapped legacy records.
#[derive(Debug, Clone)]
pub struct ConsolidationRepository {
    db: DatabaseConnection,
}

impl ConsolidationRepository {
    /// Creates a new consolidation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Migrates a single legacy record in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Consolidation` when the record cannot be
    /// mapped (the batch treats that as skip-and-log) and infrastructure
    /// errors otherwise.
    pub async fn migrate_record(
        &self,
        record: &LegacyRecord,
    ) -> Result<MigrationStatus, StoreError> {
        let legacy_id = record.legacy_id().to_string();
        let txn = self.db.begin().await?;

        let already = legacy_migrations::Entity::find_by_id(legacy_id.clone())
            .one(&txn)
            .await?
            .is_some();
        if already {
            return Ok(MigrationStatus::SkippedAlready);
        }

        let outcome = ConsolidationService::map_record(record, Utc::now())?;
        let status = match outcome {
            MigrationOutcome::Migrated(migrated) => {
                let group_id = migrated.group.id;

                convert::group_active(&migrated.group).insert(&txn).await?;
                for participant in &migrated.participants {
                    convert::participant_active(participant).insert(&txn).await?;
                }
                for entry in &migrated.entries {
                    convert::entry_active(entry).insert(&txn).await?;
                    for split in &entry.splits {
                        convert::split_active(entry.id, split).insert(&txn).await?;
                    }
                }

                mark_processed(&txn, &legacy_id, Some(group_id)).await?;
                info!(
                    legacy_id = %legacy_id,
                    %group_id,
                    participants = migrated.participants.len(),
                    entries = migrated.entries.len(),
                    "Migrated legacy record"
                );
                MigrationStatus::Migrated(group_id)
            }
            MigrationOutcome::SkippedSettled { .. } => {
                mark_processed(&txn, &legacy_id, None).await?;
                info!(legacy_id = %legacy_id, "Legacy debt fully settled, not materialized");
                MigrationStatus::SkippedSettled
            }
        };

        txn.commit().await?;
        Ok(status)
    }

    /// Runs the batch over all records.
    ///
    /// Unmappable records are logged with their legacy id and skipped;
    /// infrastructure failures abort the batch (each record committed so
    /// far stays migrated, and re-running resumes where it left off).
    ///
    /// # Errors
    ///
    /// Returns the first infrastructure error encountered.
    pub async fn run_batch(
        &self,
        records: &[LegacyRecord],
    ) -> Result<ConsolidationSummary, StoreError> {
        let mut summary = ConsolidationSummary::default();

        for record in records {
            match self.migrate_record(record).await {
                Ok(MigrationStatus::Migrated(_)) => summary.migrated += 1,
                Ok(MigrationStatus::SkippedSettled) => summary.skipped_settled += 1,
                Ok(MigrationStatus::SkippedAlready) => summary.skipped_already += 1,
                Err(StoreError::Consolidation(err)) => {
                    warn!(
                        legacy_id = record.legacy_id(),
                        error = %err,
                        "Skipping legacy record that cannot be mapped"
                    );
                    summary.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            migrated = summary.migrated,
            skipped_settled = summary.skipped_settled,
            skipped_already = summary.skipped_already,
            failed = summary.failed,
            "Consolidation batch finished"
        );
        Ok(summary)
    }
}

async fn mark_processed(
    txn: &DatabaseTransaction,
    legacy_id: &str,
    group_id: Option<GroupId>,
) -> Result<(), StoreError> {
    let row = legacy_migrations::ActiveModel {
        legacy_id: Set(legacy_id.to_string()),
        group_id: Set(group_id.map(GroupId::into_inner)),
        migrated_at: Set(Utc::now().into()),
    };
    row.insert(txn).await?;
    Ok(())
}
