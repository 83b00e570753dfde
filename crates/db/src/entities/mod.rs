//! `SeaORM` entity definitions for the unified ledger schema.

pub mod entry_splits;
pub mod ledger_entries;
pub mod ledger_groups;
pub mod legacy_migrations;
pub mod participants;
pub mod sea_orm_active_enums;
