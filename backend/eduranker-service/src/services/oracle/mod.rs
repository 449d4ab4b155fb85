/// Oracle Capabilities
///
/// Topic decay classification and per-item difficulty / comment-quality
/// estimation. All three are backed by an external LLM in production and by
/// a deterministic stub in tests and offline runs.
///
/// # Contracts
/// - **Decay classifier**: topic → `DecayInfo`, fallback `(0.347, MODERATE)`
/// - **Difficulty estimator**: (title, description) → level in `[1,5]`, fallback 3
/// - **Comment-quality estimator**: comments → score in `[0,10]`, fallback 5.0
///
/// Implementations recover from their own oracle failures with the fallback
/// values above. An `Err` returned to the caller is a failure the
/// implementation could not absorb.
pub mod cache;
pub mod estimators;
pub mod gemini;
pub mod stub;

pub use cache::{CachedDecayClassifier, DecayCache};
pub use estimators::OracleEstimator;
pub use gemini::{GeminiProvider, LlmProvider};
pub use stub::StubOracle;

use crate::models::DecayInfo;
use async_trait::async_trait;
use thiserror::Error;

pub const FALLBACK_DIFFICULTY: u8 = 3;
pub const FALLBACK_COMMENT_QUALITY: f64 = 5.0;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Request(String),

    #[error("Oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("Oracle returned no content")]
    EmptyResponse,

    #[error("Estimator failed: {0}")]
    Estimator(String),
}

pub type Result<T> = std::result::Result<T, OracleError>;

#[async_trait]
pub trait DecayClassifier: Send + Sync {
    async fn classify(&self, topic: &str) -> Result<DecayInfo>;
}

#[async_trait]
pub trait DifficultyEstimator: Send + Sync {
    async fn estimate_difficulty(&self, title: &str, description: &str) -> Result<u8>;
}

#[async_trait]
pub trait CommentQualityEstimator: Send + Sync {
    async fn estimate_comment_quality(&self, comments: &[String]) -> Result<f64>;
}
