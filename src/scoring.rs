//! Risk scoring
//!
//! The loader never computes probabilities itself; it asks a [`RiskScorer`]
//! for each record and derives the flag from the configured threshold.

use crate::error::{AppError, AppResult};
use crate::models::{ScoredKey, TransactionRecord};

/// Placeholder score used until a real model is plugged in
pub const PLACEHOLDER_SCORE: f64 = 0.5;

/// Produces a fraud probability in [0, 1] for a transaction
pub trait RiskScorer {
    fn score(&self, record: &TransactionRecord) -> f64;
}

/// Scores every transaction with the same value
#[derive(Debug, Clone, Copy)]
pub struct ConstantScorer(pub f64);

impl Default for ConstantScorer {
    fn default() -> Self {
        Self(PLACEHOLDER_SCORE)
    }
}

impl RiskScorer for ConstantScorer {
    fn score(&self, _record: &TransactionRecord) -> f64 {
        self.0
    }
}

impl<F> RiskScorer for F
where
    F: Fn(&TransactionRecord) -> f64,
{
    fn score(&self, record: &TransactionRecord) -> f64 {
        self(record)
    }
}

pub fn is_flagged(risk_score: f64, threshold: f64) -> bool {
    risk_score >= threshold
}

/// Score every record and project it down to the join key
pub fn score_records<S: RiskScorer + ?Sized>(
    scorer: &S,
    records: &[TransactionRecord],
    threshold: f64,
) -> AppResult<Vec<ScoredKey>> {
    records
        .iter()
        .map(|record| {
            let risk_score = scorer.score(record);
            if !(0.0..=1.0).contains(&risk_score) {
                return Err(AppError::InvalidScore { line: record.line, score: risk_score });
            }

            Ok(ScoredKey {
                line: record.line,
                key: record.key(),
                risk_score,
                flag: is_flagged(risk_score, threshold),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record(line: usize, amount: i64) -> TransactionRecord {
        TransactionRecord {
            line,
            time_seconds: Some(Decimal::new(1000, 0)),
            customer_id: Some("C1".to_string()),
            amount: Some(Decimal::new(amount, 2)),
        }
    }

    #[test]
    fn test_placeholder_below_default_threshold() {
        let scored = score_records(&ConstantScorer::default(), &[record(2, 4999)], 0.80).unwrap();
        assert_eq!(scored[0].risk_score, 0.5);
        assert!(!scored[0].flag);
    }

    #[test]
    fn test_flag_at_and_above_threshold() {
        assert!(is_flagged(0.85, 0.80));
        assert!(is_flagged(0.80, 0.80));
        assert!(!is_flagged(0.7999, 0.80));
    }

    #[test]
    fn test_closure_scorer() {
        let by_amount = |r: &TransactionRecord| match r.amount {
            Some(amount) if amount > Decimal::new(100, 0) => 0.9,
            _ => 0.1,
        };
        let scored = score_records(&by_amount, &[record(2, 500), record(3, 50_000)], 0.80).unwrap();
        assert!(!scored[0].flag);
        assert!(scored[1].flag);
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        for bad in [1.2, -0.01, f64::NAN] {
            match score_records(&ConstantScorer(bad), &[record(2, 1), record(7, 1)], 0.5) {
                Err(AppError::InvalidScore { line, .. }) => assert_eq!(line, 2),
                other => panic!("Expected InvalidScore, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_projection_keeps_key() {
        let scored = score_records(&ConstantScorer(0.2), &[record(4, 4999)], 0.8).unwrap();
        assert_eq!(scored[0].line, 4);
        let key = scored[0].key.as_ref().unwrap();
        assert_eq!(key.customer_id, "C1");
        assert_eq!(key.amount, Decimal::new(4999, 2));
    }
}
