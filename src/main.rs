//! Fraud Score Loader
//!
//! Single-shot batch job: reads the transaction dataset, scores it, joins it
//! to the bridge view and appends the scores to `fraud.model_scores`.

use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fraud_score_loader::{Config, ConstantScorer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    init_logging();

    let config = Config::from_env()?;

    tracing::info!("Fraud score loader starting...");
    tracing::info!(
        dataset = %config.csv_path.display(),
        threshold = config.threshold,
        model_version = %config.model_version,
        batch_size = config.batch_size,
        "Configuration loaded"
    );

    // TODO: swap in the model's predict_proba once it is exported to the loader
    let scorer = ConstantScorer::default();

    let report = fraud_score_loader::run(&config, &scorer).await?;

    tracing::info!(?report, "Run complete");
    println!("Inserted rows into fraud.model_scores: {}", report.inserted);

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fraud_score_loader=info".into());

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
