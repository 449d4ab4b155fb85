// ============================================
// Oracle-backed Estimators
// ============================================
//
// Prompt construction and reply parsing for the three oracle capabilities
// on top of any `LlmProvider`. Oracle failures on difficulty and comment
// quality are absorbed with the documented fallbacks. Classification
// failures are returned so that callers (and the decay cache) can tell a
// real answer from a fallback.

use super::{
    CommentQualityEstimator, DecayClassifier, DifficultyEstimator, LlmProvider, OracleError,
    Result, FALLBACK_COMMENT_QUALITY, FALLBACK_DIFFICULTY,
};
use crate::models::{DecayCategory, DecayInfo};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct OracleEstimator {
    provider: Arc<dyn LlmProvider>,
    integer_pattern: Regex,
    decimal_pattern: Regex,
}

impl OracleEstimator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| OracleError::Estimator(format!("bad pattern: {}", e)))
        };

        Ok(Self {
            provider,
            integer_pattern: compile(r"[0-9]+")?,
            decimal_pattern: compile(r"[0-9]+(\.[0-9]+)?")?,
        })
    }

    fn parse_category(reply: &str) -> DecayInfo {
        let reply = reply.trim().to_uppercase();
        DecayCategory::ALL
            .iter()
            .find(|category| reply.contains(category.as_str()))
            .map(|category| DecayInfo::for_category(*category))
            .unwrap_or_else(DecayInfo::fallback)
    }

    fn parse_difficulty(&self, reply: &str) -> u8 {
        // The match is all digits, so the only parse failure is overflow
        self.integer_pattern
            .find(reply)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .map(|level| level.clamp(1, 5) as u8)
            .unwrap_or(FALLBACK_DIFFICULTY)
    }

    fn parse_comment_quality(&self, reply: &str) -> f64 {
        self.decimal_pattern
            .find(reply)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(FALLBACK_COMMENT_QUALITY)
    }
}

fn decay_prompt(topic: &str) -> String {
    format!(
        r#"Analyze this educational topic: "{topic}"

Classify decay rate (choose ONE):
1. FAST (e.g. AI, Crypto, Web Frameworks)
2. MODERATE (e.g. Programming, Data Science)
3. SLOW (e.g. Math, Physics, Classics)
4. TIMELESS (e.g. Philosophy, Study Methods)

Return ONLY one word: FAST, MODERATE, SLOW, or TIMELESS."#
    )
}

fn difficulty_prompt(title: &str, description: &str) -> String {
    format!(
        "Rate the difficulty level of this video content on a scale of 1 (Beginner) to 5 (Advanced).\n\
         Title: {title}\n\
         Description: {description}\n\n\
         Return ONLY the number (1-5)."
    )
}

fn comment_prompt(comments: &[String]) -> String {
    let listing = comments
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these YouTube comments for educational value (clarity, corrections, additional info):\n\
         {listing}\n\n\
         Rate the overall educational quality of discussion on a scale of 0 to 10.\n\
         Return ONLY the number."
    )
}

#[async_trait]
impl DecayClassifier for OracleEstimator {
    async fn classify(&self, topic: &str) -> Result<DecayInfo> {
        let reply = self.provider.complete(&decay_prompt(topic)).await?;
        let info = Self::parse_category(&reply);
        debug!(topic, category = %info.category, rate = info.rate, "Topic classified");
        Ok(info)
    }
}

#[async_trait]
impl DifficultyEstimator for OracleEstimator {
    async fn estimate_difficulty(&self, title: &str, description: &str) -> Result<u8> {
        match self
            .provider
            .complete(&difficulty_prompt(title, description))
            .await
        {
            Ok(reply) => Ok(self.parse_difficulty(&reply)),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Difficulty estimation failed, using fallback"
                );
                Ok(FALLBACK_DIFFICULTY)
            }
        }
    }
}

#[async_trait]
impl CommentQualityEstimator for OracleEstimator {
    async fn estimate_comment_quality(&self, comments: &[String]) -> Result<f64> {
        if comments.is_empty() {
            return Ok(FALLBACK_COMMENT_QUALITY);
        }

        match self.provider.complete(&comment_prompt(comments)).await {
            Ok(reply) => Ok(self.parse_comment_quality(&reply)),
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Comment quality estimation failed, using fallback"
                );
                Ok(FALLBACK_COMMENT_QUALITY)
            }
        }
    }
}
