//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20260315_000001_initial;

/// The migrator for all Divvy schema migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260315_000001_initial::Migration)]
    }
}
