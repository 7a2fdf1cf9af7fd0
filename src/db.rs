//! Database module - PostgreSQL connection and output table bootstrap

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::StoreConfig;

/// Build connection options from the store configuration
pub fn connect_options(store: &StoreConfig) -> Result<PgConnectOptions, sqlx::Error> {
    if let Some(url) = &store.database_url {
        return PgConnectOptions::from_str(url);
    }

    let mut options = PgConnectOptions::new()
        .host(&store.host)
        .port(store.port)
        .database(&store.name)
        .username(&store.user);

    if let Some(password) = &store.password {
        options = options.password(password);
    }

    Ok(options)
}

/// Create the pool for a loader run.
///
/// A run holds exactly one connection: one bridge read followed by one
/// insert transaction.
pub async fn create_pool(store: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(store.connect_timeout_secs))
        .connect_with(connect_options(store)?)
        .await
}

/// Create the output schema and table if missing
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Output schema applied successfully");
    Ok(())
}

/// Output table schema.
///
/// The bridge view is owned elsewhere and is never created here.
const SCHEMA_SQL: &str = r#"
CREATE SCHEMA IF NOT EXISTS fraud;

-- Scores appended by each loader run (no uniqueness: reruns append)
CREATE TABLE IF NOT EXISTS fraud.model_scores (
    id BIGSERIAL PRIMARY KEY,
    transaction_id TEXT NOT NULL,
    transaction_date DATE,
    model_version VARCHAR(100) NOT NULL,
    risk_score DOUBLE PRECISION NOT NULL CHECK (risk_score >= 0 AND risk_score <= 1),
    threshold_used DOUBLE PRECISION NOT NULL,
    flag_xgb BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_model_scores_tx ON fraud.model_scores(transaction_id);
CREATE INDEX IF NOT EXISTS idx_model_scores_version ON fraud.model_scores(model_version);
"#;
