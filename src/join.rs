//! Exact-key inner join between scored transactions and the bridge view.
//!
//! Unmatched transactions are dropped (not an error) and counted so the
//! caller can report them. Transactions with a blank key cell are dropped
//! the same way. A key that matches several bridge rows emits one
//! output row per bridge row.

use std::collections::HashMap;

use crate::models::{BridgeRecord, JoinKey, ScoredKey, ScoredTransaction};

/// Values attached to every joined row
#[derive(Debug, Clone)]
pub struct RunTags<'a> {
    pub model_version: &'a str,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinStats {
    /// Transactions with at least one bridge match
    pub matched: usize,
    /// Transactions dropped for lack of a bridge match
    pub unmatched: usize,
    /// Transactions whose key matched more than one bridge row
    pub ambiguous: usize,
    /// Unmatched transactions that had a blank key cell
    pub null_keys: usize,
    /// Bridge rows skipped because a key column was NULL
    pub bridge_skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub rows: Vec<ScoredTransaction>,
    pub stats: JoinStats,
}

/// Index bridge rows by key, preserving their order per key
fn index_bridge(bridge: &[BridgeRecord]) -> (HashMap<JoinKey, Vec<&BridgeRecord>>, usize) {
    let mut index: HashMap<JoinKey, Vec<&BridgeRecord>> = HashMap::with_capacity(bridge.len());
    let mut skipped = 0;

    for record in bridge {
        match record.key() {
            Some(key) => index.entry(key).or_default().push(record),
            None => skipped += 1,
        }
    }

    (index, skipped)
}

pub fn inner_join(keys: &[ScoredKey], bridge: &[BridgeRecord], tags: &RunTags<'_>) -> JoinOutcome {
    let (index, bridge_skipped) = index_bridge(bridge);
    let mut outcome = JoinOutcome {
        rows: Vec::with_capacity(keys.len()),
        stats: JoinStats { bridge_skipped, ..Default::default() },
    };

    for scored in keys {
        let Some(key) = &scored.key else {
            outcome.stats.unmatched += 1;
            outcome.stats.null_keys += 1;
            continue;
        };
        let Some(matches) = index.get(key) else {
            outcome.stats.unmatched += 1;
            continue;
        };

        outcome.stats.matched += 1;
        if matches.len() > 1 {
            outcome.stats.ambiguous += 1;
            tracing::debug!(
                line = scored.line,
                customer_id = %key.customer_id,
                matches = matches.len(),
                "Transaction key matches multiple bridge rows"
            );
        }

        outcome.rows.extend(matches.iter().map(|b| ScoredTransaction {
            transaction_id: b.transaction_id.clone(),
            transaction_date: b.transaction_date,
            model_version: tags.model_version.to_string(),
            risk_score: scored.risk_score,
            threshold_used: tags.threshold,
            flag_xgb: scored.flag,
        }));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const TAGS: RunTags<'static> = RunTags { model_version: "xgb_v1", threshold: 0.80 };

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scored(line: usize, time: &str, customer: &str, amount: &str, risk_score: f64) -> ScoredKey {
        ScoredKey {
            line,
            key: Some(JoinKey {
                time_seconds: dec(time),
                customer_id: customer.to_string(),
                amount: dec(amount),
            }),
            risk_score,
            flag: risk_score >= TAGS.threshold,
        }
    }

    fn bridge(id: &str, time: &str, customer: &str, amount: &str) -> BridgeRecord {
        BridgeRecord {
            transaction_id: id.to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            time_seconds: Some(dec(time)),
            customer_id: Some(customer.to_string()),
            amount: Some(dec(amount)),
        }
    }

    #[test]
    fn test_single_match_scenario() {
        let outcome = inner_join(
            &[scored(2, "1000", "C1", "49.99", 0.5)],
            &[bridge("TX1", "1000", "C1", "49.99")],
            &TAGS,
        );

        assert_eq!(outcome.rows, vec![ScoredTransaction {
            transaction_id: "TX1".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            model_version: "xgb_v1".to_string(),
            risk_score: 0.5,
            threshold_used: 0.80,
            flag_xgb: false,
        }]);
        assert_eq!(outcome.stats.matched, 1);
        assert_eq!(outcome.stats.unmatched, 0);
    }

    #[test]
    fn test_unmatched_rows_dropped() {
        let outcome = inner_join(
            &[
                scored(2, "1000", "C1", "49.99", 0.5),
                scored(3, "1000", "C1", "50.00", 0.5),
                scored(4, "1001", "C1", "49.99", 0.5),
                scored(5, "1000", "C2", "49.99", 0.5),
            ],
            &[bridge("TX1", "1000", "C1", "49.99")],
            &TAGS,
        );

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.stats.matched, 1);
        assert_eq!(outcome.stats.unmatched, 3);
    }

    #[test]
    fn test_no_bridge_rows() {
        let outcome = inner_join(&[scored(2, "1000", "C1", "49.99", 0.5)], &[], &TAGS);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.stats.unmatched, 1);
    }

    #[test]
    fn test_scale_does_not_break_match() {
        let outcome = inner_join(
            &[scored(2, "1000.0", "C1", "49.990", 0.85)],
            &[bridge("TX1", "1000", "C1", "49.99")],
            &TAGS,
        );
        assert_eq!(outcome.rows.len(), 1);
        assert!(outcome.rows[0].flag_xgb);
    }

    #[test]
    fn test_flag_matches_threshold_on_every_row() {
        let keys: Vec<ScoredKey> = [0.1, 0.79, 0.8, 0.95]
            .iter()
            .enumerate()
            .map(|(i, s)| scored(i + 2, &(1000 + i).to_string(), "C1", "10", *s))
            .collect();
        let bridge_rows: Vec<BridgeRecord> = (0..4)
            .map(|i| bridge(&format!("TX{}", i), &(1000 + i).to_string(), "C1", "10"))
            .collect();

        let outcome = inner_join(&keys, &bridge_rows, &TAGS);
        assert_eq!(outcome.rows.len(), 4);
        for row in &outcome.rows {
            assert_eq!(row.threshold_used, 0.80);
            assert_eq!(row.flag_xgb, row.risk_score >= row.threshold_used);
        }
    }

    #[test]
    fn test_duplicate_bridge_keys_fan_out_in_order() {
        let outcome = inner_join(
            &[scored(2, "1000", "C1", "49.99", 0.5), scored(3, "7", "C9", "1", 0.5)],
            &[
                bridge("TX1", "1000", "C1", "49.99"),
                bridge("TX7", "7", "C9", "1"),
                bridge("TX2", "1000", "C1", "49.99"),
            ],
            &TAGS,
        );

        let ids: Vec<&str> = outcome.rows.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["TX1", "TX2", "TX7"]);
        assert_eq!(outcome.stats.matched, 2);
        assert_eq!(outcome.stats.ambiguous, 1);
    }

    #[test]
    fn test_padded_customer_id_does_not_match() {
        let outcome = inner_join(
            &[scored(2, "1000", " C1 ", "49.99", 0.5)],
            &[bridge("TX1", "1000", "C1", "49.99")],
            &TAGS,
        );
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.stats.unmatched, 1);
    }

    #[test]
    fn test_blank_transaction_key_dropped_and_counted() {
        let mut blank = scored(3, "1001", "C2", "1", 0.5);
        blank.key = None;

        let outcome = inner_join(
            &[scored(2, "1000", "C1", "49.99", 0.5), blank],
            &[bridge("TX1", "1000", "C1", "49.99")],
            &TAGS,
        );

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.stats.matched, 1);
        assert_eq!(outcome.stats.unmatched, 1);
        assert_eq!(outcome.stats.null_keys, 1);
    }

    #[test]
    fn test_null_bridge_keys_skipped() {
        let mut broken = bridge("TX1", "1000", "C1", "49.99");
        broken.amount = None;

        let outcome = inner_join(&[scored(2, "1000", "C1", "49.99", 0.5)], &[broken], &TAGS);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.stats.bridge_skipped, 1);
    }
}
