//! Configuration module

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::MAX_BATCH_SIZE;

/// Loader configuration, built once at process start
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Dataset location
    pub csv_path: PathBuf,

    /// Decision threshold for the flag
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,

    /// Model version tag stored with every score
    #[validate(length(min = 1))]
    pub model_version: String,

    /// Rows per insert round-trip
    #[validate(range(min = 1))]
    pub batch_size: usize,

    /// Create the output table before loading
    pub apply_schema: bool,

    #[validate(nested)]
    pub store: StoreConfig,
}

/// Store connection parameters
#[derive(Clone, Validate)]
pub struct StoreConfig {
    /// Full connection URL, takes precedence over the individual fields
    pub database_url: Option<String>,

    #[validate(length(min = 1))]
    pub host: String,

    pub port: u16,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub user: String,

    pub password: Option<String>,

    /// Seconds to wait for the connection
    #[validate(range(min = 1))]
    pub connect_timeout_secs: u64,
}

pub const DEFAULT_CSV_PATH: &str = "dataset/creditcard_enhanced_UAE_FINAL.csv";
pub const DEFAULT_THRESHOLD: f64 = 0.80;
pub const DEFAULT_MODEL_VERSION: &str = "xgb_v1";
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let threshold: f64 = parse_or(&lookup, "THRESHOLD", DEFAULT_THRESHOLD)?;
        if !threshold.is_finite() {
            return Err(AppError::Config(format!("THRESHOLD must be a finite number, got {}", threshold)));
        }

        let config = Self {
            csv_path: lookup("CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH)),

            threshold,

            model_version: lookup("MODEL_VERSION")
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),

            batch_size: parse_or(&lookup, "BATCH_SIZE", DEFAULT_BATCH_SIZE)?,

            apply_schema: parse_flag(&lookup, "APPLY_SCHEMA")?,

            store: StoreConfig {
                database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(&lookup, "DB_PORT", 5432)?,
                name: lookup("DB_NAME").unwrap_or_else(|| "try".to_string()),
                user: lookup("DB_USER").unwrap_or_else(|| "user".to_string()),
                password: lookup("DB_PASSWORD"),
                connect_timeout_secs: parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 30)?,
            },
        };

        config.validate()?;
        if config.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::Config(format!(
                "BATCH_SIZE must be at most {}, got {}",
                MAX_BATCH_SIZE, config.batch_size
            )));
        }
        Ok(config)
    }
}

impl StoreConfig {
    /// Connection target as `host:port/database`, safe to log.
    ///
    /// A URL is parsed rather than cut, so userinfo and query parameters
    /// (`?password=...`) never reach the output.
    pub fn display_target(&self) -> String {
        match &self.database_url {
            Some(url) => match PgConnectOptions::from_str(url) {
                Ok(options) => format!(
                    "{}:{}/{}",
                    options.get_host(),
                    options.get_port(),
                    options.get_database().unwrap_or_default()
                ),
                Err(_) => "<invalid DATABASE_URL>".to_string(),
            },
            None => format!("{}:{}/{}", self.host, self.port, self.name),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("target", &self.display_target())
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if ["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => Ok(true),
        Some(v) if ["0", "false", "no", "off"].iter().any(|f| v.eq_ignore_ascii_case(f)) => Ok(false),
        Some(v) => Err(AppError::Config(format!("{} has invalid value '{}': expected true or false", key, v))),
    }
}
