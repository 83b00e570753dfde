//! `SeaORM` Entity for the legacy_migrations table.
//!
//! Idempotency ledger for the consolidation batch: one row per legacy
//! record that has been processed. `group_id` is null when a record was
//! examined but intentionally not materialized (fully-settled debts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "legacy_migrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub legacy_id: String,
    pub group_id: Option<Uuid>,
    pub migrated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
