//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! All balance mutation happens here inside database transactions that
//! exclusively lock the affected group's participant rows, so concurrent
//! writers cannot apply deltas against stale balances.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    ConsolidationRepository, EntryRepository, GroupRepository, StoreError, with_retries,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
