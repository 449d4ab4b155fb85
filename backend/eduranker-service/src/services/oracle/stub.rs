// ============================================
// Deterministic Stub Oracle
// ============================================
//
// Offline stand-in for the LLM oracle. Topics are classified by keyword
// matching against the example subjects of each decay category; difficulty
// and comment quality are fixed values.

use super::{
    CommentQualityEstimator, DecayClassifier, DifficultyEstimator, Result,
    FALLBACK_COMMENT_QUALITY, FALLBACK_DIFFICULTY,
};
use crate::models::{DecayCategory, DecayInfo};
use async_trait::async_trait;

const FAST_KEYWORDS: &[&str] = &[
    "ai", "machine learning", "llm", "crypto", "blockchain", "web framework", "react",
    "kubernetes",
];
const SLOW_KEYWORDS: &[&str] = &[
    "math", "calculus", "algebra", "geometry", "physics", "chemistry", "classics", "latin",
];
const TIMELESS_KEYWORDS: &[&str] = &[
    "philosophy", "ethics", "logic", "study method", "meditation", "rhetoric",
];

#[derive(Debug, Clone)]
pub struct StubOracle {
    difficulty: u8,
    comment_quality: f64,
}

impl Default for StubOracle {
    fn default() -> Self {
        Self {
            difficulty: FALLBACK_DIFFICULTY,
            comment_quality: FALLBACK_COMMENT_QUALITY,
        }
    }
}

impl StubOracle {
    pub fn new(difficulty: u8, comment_quality: f64) -> Self {
        Self {
            difficulty: difficulty.clamp(1, 5),
            comment_quality: comment_quality.clamp(0.0, 10.0),
        }
    }

    fn matches(topic: &str, keywords: &[&str]) -> bool {
        topic
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|word| keywords.iter().any(|k| !k.contains(' ') && word == *k))
            || keywords
                .iter()
                .filter(|k| k.contains(' '))
                .any(|phrase| topic.contains(phrase))
    }

    pub fn category_for(topic: &str) -> DecayCategory {
        let topic = topic.to_lowercase();

        if Self::matches(&topic, FAST_KEYWORDS) {
            DecayCategory::Fast
        } else if Self::matches(&topic, SLOW_KEYWORDS) {
            DecayCategory::Slow
        } else if Self::matches(&topic, TIMELESS_KEYWORDS) {
            DecayCategory::Timeless
        } else {
            DecayCategory::Moderate
        }
    }
}

#[async_trait]
impl DecayClassifier for StubOracle {
    async fn classify(&self, topic: &str) -> Result<DecayInfo> {
        Ok(DecayInfo::for_category(Self::category_for(topic)))
    }
}

#[async_trait]
impl DifficultyEstimator for StubOracle {
    async fn estimate_difficulty(&self, _title: &str, _description: &str) -> Result<u8> {
        Ok(self.difficulty)
    }
}

#[async_trait]
impl CommentQualityEstimator for StubOracle {
    async fn estimate_comment_quality(&self, comments: &[String]) -> Result<f64> {
        if comments.is_empty() {
            return Ok(FALLBACK_COMMENT_QUALITY);
        }
        Ok(self.comment_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        assert_eq!(StubOracle::category_for("Generative AI"), DecayCategory::Fast);
        assert_eq!(StubOracle::category_for("Intro to Machine Learning"), DecayCategory::Fast);
        assert_eq!(StubOracle::category_for("Basic Math"), DecayCategory::Slow);
        assert_eq!(StubOracle::category_for("Quantum PHYSICS"), DecayCategory::Slow);
        assert_eq!(StubOracle::category_for("Philosophy of Mind"), DecayCategory::Timeless);
        assert_eq!(StubOracle::category_for("Python Programming"), DecayCategory::Moderate);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        // "ai" must not match inside "Spain" or "maintenance"
        assert_eq!(StubOracle::category_for("History of Spain"), DecayCategory::Moderate);
        assert_eq!(StubOracle::category_for("Car maintenance"), DecayCategory::Moderate);
    }

    #[tokio::test]
    async fn test_fixed_estimates() {
        let stub = StubOracle::new(9, 7.0);
        assert_eq!(stub.estimate_difficulty("t", "d").await.unwrap(), 5);
        assert_eq!(
            stub.estimate_comment_quality(&["good".to_string()]).await.unwrap(),
            7.0
        );
        assert_eq!(stub.estimate_comment_quality(&[]).await.unwrap(), 5.0);
        assert_eq!(
            stub.classify("Crypto trading").await.unwrap(),
            DecayInfo::for_category(DecayCategory::Fast)
        );
    }
}
