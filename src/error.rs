//! Error handling

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Input errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    // Scoring errors
    #[error("Invalid risk score {score} for dataset line {line}: expected a value in [0, 1]")]
    InvalidScore { line: usize, score: f64 },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Dataset(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(err.to_string())
    }
}
