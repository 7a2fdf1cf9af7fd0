//! Bridge model (canonical transaction identity)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};

use super::transaction::JoinKey;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BridgeRecord {
    pub transaction_id: String,
    pub transaction_date: Option<NaiveDate>,
    pub time_seconds: Option<Decimal>,
    pub customer_id: Option<String>,
    pub amount: Option<Decimal>,
}

/// Key columns are cast to `numeric` so both sides compare as fixed-point
/// decimals regardless of how the view declares them.
const BRIDGE_SQL: &str = r#"
SELECT transaction_id::text AS transaction_id,
       transaction_date::date AS transaction_date,
       time_seconds::numeric AS time_seconds,
       customer_id::text AS customer_id,
       amount::numeric AS amount
FROM fraud.v_scoring_bridge
"#;

impl BridgeRecord {
    /// Fetch the whole bridge view
    pub async fn fetch_all(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BridgeRecord>(BRIDGE_SQL)
            .fetch_all(conn)
            .await
    }

    /// Join key, or `None` when any key column is NULL
    pub fn key(&self) -> Option<JoinKey> {
        Some(JoinKey {
            time_seconds: self.time_seconds?,
            customer_id: self.customer_id.clone()?,
            amount: self.amount?,
        })
    }
}
