//! Transaction model (dataset side of the join)

use rust_decimal::Decimal;

/// One dataset row
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// 1-based line number in the dataset (header is line 1)
    pub line: usize,
    /// Blank cells are `None` and can never join
    pub time_seconds: Option<Decimal>,
    pub customer_id: Option<String>,
    pub amount: Option<Decimal>,
}

/// Minimal projection carried into the join
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredKey {
    pub line: usize,
    /// `None` when a key cell was blank
    pub key: Option<JoinKey>,
    pub risk_score: f64,
    pub flag: bool,
}

/// Natural key shared by the dataset and the bridge view.
///
/// Decimal equality and hashing are scale-independent, so `49.99` and
/// `49.990` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    pub time_seconds: Decimal,
    pub customer_id: String,
    pub amount: Decimal,
}

impl TransactionRecord {
    /// Join key, or `None` when any key cell is blank
    pub fn key(&self) -> Option<JoinKey> {
        Some(JoinKey {
            time_seconds: self.time_seconds?,
            customer_id: self.customer_id.clone()?,
            amount: self.amount?,
        })
    }
}
