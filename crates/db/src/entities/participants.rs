//! `SeaORM` Entity for the participants table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ParticipantRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    /// Registered-user reference; mutually exclusive with the contact
    /// fields.
    pub user_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub role: ParticipantRole,
    /// Signed running balance; cache over the entry log.
    pub balance: Decimal,
    pub is_active: bool,
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
