//! Dataset reader
//!
//! Loads the transaction CSV fully into memory. Only `Time`, `customer_id`
//! and `Amount` are read; every other column is ignored.
//!
//! `customer_id` is kept byte-for-byte. Blank key cells become `None` so the
//! row is dropped by the join instead of failing the run.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::TransactionRecord;

pub const REQUIRED_COLUMNS: [&str; 3] = ["Time", "customer_id", "Amount"];

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Time")]
    time: String,
    customer_id: String,
    #[serde(rename = "Amount")]
    amount: String,
}

/// Load the dataset at `path`
pub fn load_transactions(path: &Path) -> AppResult<Vec<TransactionRecord>> {
    let file = File::open(path).map_err(|e| {
        AppError::Dataset(format!("Failed to open dataset '{}': {}", path.display(), e))
    })?;

    let records = read_transactions(file)?;
    tracing::info!("Loaded {} transactions from {}", records.len(), path.display());
    Ok(records)
}

/// Read transactions from any CSV source
pub fn read_transactions<R: Read>(source: R) -> AppResult<Vec<TransactionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Dataset(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<RawRow>().enumerate() {
        // Header is line 1
        let line = idx + 2;
        let raw = result.map_err(|e| AppError::Dataset(format!("Line {}: {}", line, e)))?;

        records.push(TransactionRecord {
            line,
            time_seconds: parse_decimal(&raw.time, "Time", line)?,
            customer_id: Some(raw.customer_id).filter(|id| !id.is_empty()),
            amount: parse_decimal(&raw.amount, "Amount", line)?,
        });
    }

    Ok(records)
}

fn parse_decimal(raw: &str, column: &str, line: usize) -> AppResult<Option<Decimal>> {
    let cell = raw.trim();
    if cell.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .map(Some)
        .map_err(|_| AppError::Dataset(format!("Line {}: invalid {} value '{}'", line, column, raw)))
}
