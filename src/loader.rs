//! Score loader pipeline
//!
//! ```text
//! dataset.csv ──► score + flag ──► key projection ─┐
//!                                                  ├─► inner join ──► batched insert (one tx)
//! fraud.v_scoring_bridge ──────────────────────────┘                  fraud.model_scores
//! ```
//!
//! The dataset is read and scored before any connection is made, so input
//! errors never touch the store.

use crate::config::Config;
use crate::dataset;
use crate::db;
use crate::error::AppResult;
use crate::join::{self, RunTags};
use crate::models::ScoredKey;
use crate::scoring::{self, RiskScorer};
use crate::store::{PgScoreStore, ScoreStore};

/// Outcome of one loader run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub bridge_rows: usize,
    pub bridge_skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    /// Dropped transactions that had a blank key cell (included in `unmatched`)
    pub null_keys: usize,
    pub inserted: u64,
    pub batches: usize,
}

/// Run the full pipeline against PostgreSQL.
///
/// The pool is closed on every path once it has been opened.
pub async fn run<R: RiskScorer + ?Sized>(config: &Config, scorer: &R) -> AppResult<LoadReport> {
    let records = dataset::load_transactions(&config.csv_path)?;
    let keys = scoring::score_records(scorer, &records, config.threshold)?;

    tracing::info!("Connecting to {}", config.store.display_target());
    let pool = db::create_pool(&config.store).await?;
    let mut store = PgScoreStore::new(pool);

    let result: AppResult<LoadReport> = async {
        if config.apply_schema {
            db::apply_schema(store.pool()).await?;
        }
        load_scored(&mut store, &keys, config).await
    }
    .await;

    store.close().await;
    result
}

/// Join scored keys to the bridge and insert the survivors
pub async fn load_scored<S: ScoreStore + ?Sized>(
    store: &mut S,
    keys: &[ScoredKey],
    config: &Config,
) -> AppResult<LoadReport> {
    let bridge = store.fetch_bridge().await?;

    let tags = RunTags {
        model_version: &config.model_version,
        threshold: config.threshold,
    };
    let outcome = join::inner_join(keys, &bridge, &tags);

    if outcome.stats.unmatched > 0 {
        tracing::info!("{} transaction(s) had no bridge match and were dropped", outcome.stats.unmatched);
    }
    if outcome.stats.null_keys > 0 {
        tracing::warn!("{} transaction(s) have blank key cells", outcome.stats.null_keys);
    }
    if outcome.stats.ambiguous > 0 {
        tracing::warn!("{} transaction(s) matched more than one bridge row", outcome.stats.ambiguous);
    }
    if outcome.stats.bridge_skipped > 0 {
        tracing::warn!("{} bridge row(s) have NULL key columns", outcome.stats.bridge_skipped);
    }

    let mut report = LoadReport {
        rows_read: keys.len(),
        bridge_rows: bridge.len(),
        bridge_skipped: outcome.stats.bridge_skipped,
        matched: outcome.stats.matched,
        unmatched: outcome.stats.unmatched,
        ambiguous: outcome.stats.ambiguous,
        null_keys: outcome.stats.null_keys,
        ..Default::default()
    };

    if outcome.rows.is_empty() {
        tracing::info!("No rows survived the join, nothing to insert");
        return Ok(report);
    }

    let summary = store.insert_scores(&outcome.rows, config.batch_size).await?;
    report.inserted = summary.inserted;
    report.batches = summary.batches;

    tracing::info!(
        rows_read = report.rows_read,
        matched = report.matched,
        unmatched = report.unmatched,
        inserted = report.inserted,
        model_version = %config.model_version,
        "Scores loaded"
    );

    Ok(report)
}
