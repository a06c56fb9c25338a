//! Score Once - one-shot check of the scoring endpoint
//!
//! Submits the default customer profile (optionally with overrides) once and
//! prints the accepted response as JSON on stdout.
//!
//! Usage:
//!   cargo run --bin score_once -- [attribute=value ...]
//!
//! Environment variables:
//!   SCORING_URL - scoring API base (default: http://127.0.0.1:8000/api)
//!   SCORING_TIMEOUT_SECS - request timeout (default: 10)
//!   TOP_FACTORS - risk factors to keep (default: 3)

use churnscope::{
    config::Config,
    profile,
    record::EditValue,
    simulation::{HttpScorer, Scorer, ScoringResponse},
};
use dotenv::dotenv;
use log::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env()?;
    let scorer = HttpScorer::new(&config.scoring_url, config.scoring_timeout(), config.top_factors)?;

    let mut record = profile::default_profile();
    for arg in std::env::args().skip(1) {
        let Some((attribute, value)) = arg.split_once('=') else {
            warn!("⚠️  Ignoring argument without '=': {}", arg);
            continue;
        };
        profile::apply_edit(&mut record, attribute, EditValue::from(value));
    }

    let missing = record.missing_attributes(&profile::required_attributes());
    if !missing.is_empty() {
        error!("❌ Profile incomplete, missing: {:?}", missing);
        return Err(format!("{} required attribute(s) missing", missing.len()).into());
    }
    if profile::totals_look_low(&record) {
        warn!("⚠️  TotalCharges seems low for the given tenure and MonthlyCharges");
    }

    info!("📡 POST {}", scorer.endpoint());
    let scored = scorer.score(&record).await.map_err(|e| {
        error!("❌ Scoring failed: {}", e);
        e
    })?;

    let response = ScoringResponse::new(1, scored);
    info!(
        "✅ {} ({:.1}%)",
        response.outcome.risk_label(),
        response.outcome.probability * 100.0
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
