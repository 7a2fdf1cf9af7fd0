//! Fraud Score Loader
//!
//! Scores a transaction dataset, resolves every row to its canonical
//! transaction id through the `fraud.v_scoring_bridge` view and appends the
//! results to `fraud.model_scores` in a single transaction.

pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod join;
pub mod loader;
pub mod models;
pub mod scoring;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use loader::{run, LoadReport};
pub use scoring::{ConstantScorer, RiskScorer};
pub use store::{PgScoreStore, ScoreStore};
