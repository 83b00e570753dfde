//! `SeaORM` Entity for the ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SplitType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub entry_date: Date,
    pub paid_by: Uuid,
    pub split_type: SplitType,
    pub category_id: Option<Uuid>,
    pub notes: Option<String>,
    pub is_settlement: bool,
    /// Soft-delete marker; balances exclude entries with this set.
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_groups::Entity",
        from = "Column::GroupId",
        to = "super::ledger_groups::Column::Id"
    )]
    LedgerGroups,
    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::PaidBy",
        to = "super::participants::Column::Id"
    )]
    Participants,
    #[sea_orm(has_many = "super::entry_splits::Entity")]
    EntrySplits,
}

impl Related<super::ledger_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerGroups.def()
    }
}

impl Related<super::entry_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntrySplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
