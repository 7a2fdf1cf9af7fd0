//! Score store - the two round-trips a loader run makes

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{BridgeRecord, ScoredTransaction, MAX_BATCH_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: u64,
    pub batches: usize,
}

/// Where bridge rows come from and scored rows go to
#[async_trait]
pub trait ScoreStore: Send {
    /// Read the whole bridge view
    async fn fetch_bridge(&mut self) -> AppResult<Vec<BridgeRecord>>;

    /// Append `rows` in batches of `batch_size`.
    ///
    /// Either every batch is persisted or none is.
    async fn insert_scores(&mut self, rows: &[ScoredTransaction], batch_size: usize) -> AppResult<InsertSummary>;
}

/// PostgreSQL store backed by a single-connection pool
pub struct PgScoreStore {
    pool: PgPool,
}

impl PgScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to be released
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ScoreStore for PgScoreStore {
    async fn fetch_bridge(&mut self) -> AppResult<Vec<BridgeRecord>> {
        let mut conn = self.pool.acquire().await?;
        let rows = BridgeRecord::fetch_all(&mut conn).await?;
        tracing::info!("Fetched {} bridge rows", rows.len());
        Ok(rows)
    }

    async fn insert_scores(&mut self, rows: &[ScoredTransaction], batch_size: usize) -> AppResult<InsertSummary> {
        let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        let mut summary = InsertSummary::default();
        let mut tx = self.pool.begin().await?;

        for (batch, chunk) in rows.chunks(batch_size).enumerate() {
            match ScoredTransaction::insert_batch(&mut tx, chunk).await {
                Ok(count) => {
                    summary.inserted += count;
                    summary.batches += 1;
                    tracing::debug!(batch, rows = count, "Batch staged");
                }
                Err(e) => {
                    tracing::error!(batch, error = %e, "Batch insert failed, rolling back");
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::error!("Rollback failed: {}", rollback_err);
                    }
                    return Err(e.into());
                }
            }
        }

        tx.commit().await?;
        tracing::info!("Committed {} rows in {} batch(es)", summary.inserted, summary.batches);
        Ok(summary)
    }
}
