//! Legacy data consolidation batch for Divvy.
//!
//! Reads a JSON export of the two retired subsystems (two-party debts and
//! multi-party expense groups) and replays it into the unified ledger
//! schema. Safe to re-run: already-migrated records are skipped by legacy
//! id, and each record migrates in its own transaction, so the batch can
//! be interrupted between records without leaving partial groups.
//!
//! There is no reverse migration. Take a database backup before running.
//!
//! Usage:
//!   consolidator [path/to/legacy_export.json]

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use divvy_core::consolidation::LegacyRecord;
use divvy_db::repositories::ConsolidationRepository;
use divvy_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let export_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.consolidation.export_path.clone());

    let raw = std::fs::read_to_string(&export_path)
        .with_context(|| format!("Failed to read legacy export {export_path}"))?;
    let records: Vec<LegacyRecord> =
        serde_json::from_str(&raw).context("Legacy export is not valid JSON")?;
    info!(count = records.len(), export_path = %export_path, "Loaded legacy export");

    let db = divvy_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let repository = ConsolidationRepository::new(db);
    let summary = repository
        .run_batch(&records)
        .await
        .context("Consolidation batch failed")?;

    info!(
        total = summary.total(),
        migrated = summary.migrated,
        skipped_settled = summary.skipped_settled,
        skipped_already = summary.skipped_already,
        failed = summary.failed,
        "Consolidation complete"
    );
    println!(
        "Consolidated {} records: {} migrated, {} settled (skipped), {} already done, {} failed",
        summary.total(),
        summary.migrated,
        summary.skipped_settled,
        summary.skipped_already,
        summary.failed
    );

    Ok(())
}
