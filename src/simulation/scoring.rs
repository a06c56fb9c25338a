//! Remote scoring collaborator
//!
//! The churn model lives behind an HTTP API. This module defines the
//! `Scorer` seam the sequencer calls through, the response types the rest of
//! the crate works with, and the reqwest-backed client.
//!
//! ## API Reference
//!
//! Endpoint: POST {SCORING_URL}/predict/
//! Body: the observation record as a flat JSON object
//! Returns:
//!
//! ```json
//! {
//!   "classification": { "prediction": 1, "probability": 0.82 },
//!   "top_risk_factors": [ { "feature": "cat__Contract_Month-to-month", "importance": 0.19 } ]
//! }
//! ```

use crate::record::ObservationRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monotonically increasing tag of one scoring request/response pair
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictedClass {
    Stay,
    Churn,
}

impl PredictedClass {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            PredictedClass::Churn
        } else {
            PredictedClass::Stay
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub predicted_class: PredictedClass,
    /// Probability of churn, in [0, 1]
    pub probability: f64,
}

impl Outcome {
    pub fn is_high_risk(&self) -> bool {
        self.probability > 0.5
    }

    pub fn risk_label(&self) -> &'static str {
        if self.is_high_risk() {
            "Likely to Churn"
        } else {
            "Likely to Stay"
        }
    }
}

/// One explanatory factor, ordered by descending weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub weight: f64,
}

/// What the scorer returns for a record, before it is tagged with a generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProfile {
    pub outcome: Outcome,
    pub factors: Vec<RiskFactor>,
}

/// An accepted scoring result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResponse {
    pub generation: Generation,
    pub outcome: Outcome,
    pub factors: Vec<RiskFactor>,
    pub received_at: DateTime<Utc>,
}

impl ScoringResponse {
    pub fn new(generation: Generation, profile: ScoredProfile) -> Self {
        Self {
            generation,
            outcome: profile.outcome,
            factors: profile.factors,
            received_at: Utc::now(),
        }
    }
}

/// Why a scoring call failed
///
/// Stored in the published snapshot, so it carries strings instead of the
/// underlying reqwest/serde errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringError {
    Transport(String),
    Timeout,
    Status(u16),
    Decode(String),
    InvalidResponse(String),
}

impl std::fmt::Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringError::Transport(e) => write!(f, "Transport error: {}", e),
            ScoringError::Timeout => write!(f, "Scoring request timed out"),
            ScoringError::Status(code) => write!(f, "Scoring API error: HTTP {}", code),
            ScoringError::Decode(e) => write!(f, "Could not decode scoring response: {}", e),
            ScoringError::InvalidResponse(e) => write!(f, "Invalid scoring response: {}", e),
        }
    }
}

impl std::error::Error for ScoringError {}

impl From<reqwest::Error> for ScoringError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoringError::Timeout
        } else if err.is_decode() {
            ScoringError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ScoringError::Status(status.as_u16())
        } else {
            ScoringError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::Decode(err.to_string())
    }
}

/// Asynchronous scoring function: complete record in, profile or error out
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, record: &ObservationRecord) -> Result<ScoredProfile, ScoringError>;
}

#[derive(Debug, Deserialize)]
struct RiskProfileWire {
    classification: ClassificationWire,
    top_risk_factors: Vec<FactorWire>,
}

#[derive(Debug, Deserialize)]
struct ClassificationWire {
    prediction: i64,
    probability: f64,
}

#[derive(Debug, Deserialize)]
struct FactorWire {
    feature: String,
    importance: f64,
}

/// Decode a risk profile body, keeping at most `top_n` factors
///
/// Rejects probabilities outside [0, 1]. Factors are re-sorted by weight in
/// case the server did not.
pub fn parse_risk_profile(body: &str, top_n: usize) -> Result<ScoredProfile, ScoringError> {
    let wire: RiskProfileWire = serde_json::from_str(body)?;

    let probability = wire.classification.probability;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ScoringError::InvalidResponse(format!(
            "probability {} outside [0, 1]",
            probability
        )));
    }

    let mut factors: Vec<RiskFactor> = wire
        .top_risk_factors
        .into_iter()
        .map(|f| RiskFactor {
            name: f.feature,
            weight: f.importance,
        })
        .collect();
    factors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    factors.truncate(top_n);

    Ok(ScoredProfile {
        outcome: Outcome {
            predicted_class: PredictedClass::from_code(wire.classification.prediction),
            probability,
        },
        factors,
    })
}

/// reqwest client for the scoring API
pub struct HttpScorer {
    client: reqwest::Client,
    endpoint: String,
    top_n: usize,
}

impl HttpScorer {
    pub fn new(base_url: &str, timeout: Duration, top_n: usize) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/predict/", base_url.trim_end_matches('/')),
            top_n,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn score(&self, record: &ObservationRecord) -> Result<ScoredProfile, ScoringError> {
        let response = self.client.post(&self.endpoint).json(record).send().await?;

        if !response.status().is_success() {
            return Err(ScoringError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_risk_profile(&body, self.top_n)
    }
}
