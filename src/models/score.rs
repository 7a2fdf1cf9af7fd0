//! Model score model (output rows)

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};

/// Bind parameters per inserted row
pub const INSERT_COLUMNS: usize = 6;

/// Largest batch that stays under the PostgreSQL bind parameter limit
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize / INSERT_COLUMNS;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ScoredTransaction {
    pub transaction_id: String,
    pub transaction_date: Option<NaiveDate>,
    pub model_version: String,
    pub risk_score: f64,
    pub threshold_used: f64,
    pub flag_xgb: bool,
}

impl ScoredTransaction {
    /// Insert one batch as a single multi-row statement
    pub async fn insert_batch(conn: &mut PgConnection, rows: &[Self]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO fraud.model_scores \
             (transaction_id, transaction_date, model_version, risk_score, threshold_used, flag_xgb) ",
        );

        builder.push_values(rows, |mut b, row| {
            b.push_bind(row.transaction_id.clone())
                .push_bind(row.transaction_date)
                .push_bind(row.model_version.clone())
                .push_bind(row.risk_score)
                .push_bind(row.threshold_used)
                .push_bind(row.flag_xgb);
        });

        let result = builder.build().execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// Count stored rows, optionally for one model version
    pub async fn count(conn: &mut PgConnection, model_version: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fraud.model_scores WHERE $1::text IS NULL OR model_version = $1"
        )
        .bind(model_version)
        .fetch_one(conn)
        .await
    }
}
