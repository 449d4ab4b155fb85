// ============================================
// ETAS Score Calculator
// ============================================
//
// Combines five 0-100 signals into one composite score with a weighted
// geometric mean:
//
//   total = 10 * Π scale(metric_i) ^ w_i,   scale(x) = max(0.1, x / 10)
//
// E  engagement: like ratio damped by view volume
// R  relevance: exponential age decay with a freshness boost
// C  comment quality (oracle, 0-10 rescaled)
// S  subject complexity (constant)
// D  difficulty alignment between item and learner
//
// Weights come from the topic's decay category.

use crate::models::{DecayInfo, Item, ScoreRecord, SubScores, UserLevel, WeightSet};
use crate::utils::round1;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Guards the like ratio against zero likes and dislikes
const EPSILON: f64 = 1e-10;
/// Views at which the engagement damping reaches tanh(1)
const VIEW_NORM: f64 = 100_000.0;
/// Freshness boost amplitude
const FRESHNESS_ALPHA: f64 = 0.2;
/// Freshness boost decay speed (per year)
const FRESHNESS_BETA: f64 = 2.0;
/// Placeholder heuristic, identical for every item
pub const SUBJECT_COMPLEXITY: f64 = 90.0;
/// Largest difficulty level; normalizes the level delta
const MAX_DIFFICULTY: f64 = 5.0;
/// Floor applied before exponentiation so the base is always positive
const SCALE_FLOOR: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("Invalid decay rate: {0}")]
    InvalidDecayRate(f64),

    #[error("Invalid comment quality: {0}")]
    InvalidCommentQuality(f64),

    #[error("Composite score is not finite for item {0}")]
    NonFiniteScore(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Engagement (E): `2 * likes/(likes+dislikes+ε) * tanh(views/100000) * 100`, clamped to [0,100]
pub fn engagement(views: u64, likes: u64, dislikes: u64) -> f64 {
    let likes = likes as f64;
    let like_ratio = likes / (likes + dislikes as f64 + EPSILON);
    let raw = 2.0 * like_ratio * (views as f64 / VIEW_NORM).tanh() * 100.0;
    raw.clamp(0.0, 100.0)
}

/// Whole days since publication divided by 365; future dates count as zero
pub fn age_years(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - published_at).num_days();
    (days as f64 / 365.0).max(0.0)
}

/// Relevance (R): `exp(-rate*age) * (1 + 0.2*exp(-2*age)) * 100`, clamped to [0,100]
pub fn relevance(rate: f64, age_years: f64) -> f64 {
    let freshness = 1.0 + FRESHNESS_ALPHA * (-FRESHNESS_BETA * age_years).exp();
    let raw = (-rate * age_years).exp() * freshness * 100.0;
    raw.clamp(0.0, 100.0)
}

/// Comment quality (C): oracle score 0-10 rescaled, capped at 100
pub fn comment_quality(score: f64) -> f64 {
    (score * 10.0).min(100.0)
}

/// Difficulty alignment (D): `(1 - |difficulty - level| / 5) * 100`
///
/// Evaluated as `(5 - delta) * 100 / 5` so every level gap lands on an exact
/// multiple of 20.
pub fn difficulty_alignment(difficulty: u8, user_level: UserLevel) -> f64 {
    let delta = (difficulty as f64 - user_level.value() as f64).abs();
    (MAX_DIFFICULTY - delta) * 100.0 / MAX_DIFFICULTY
}

pub fn scale(x: f64) -> f64 {
    (x / 10.0).max(SCALE_FLOOR)
}

/// Weighted geometric mean of the sub-scores, rescaled by 10 (unrounded)
pub fn composite_total(scores: &SubScores, weights: &WeightSet) -> f64 {
    let product: f64 = scores
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(metric, weight)| scale(*metric).powf(*weight))
        .product();

    10.0 * product
}

/// Score one item.
///
/// `comment_score` is the oracle's 0-10 comment quality and `difficulty` the
/// oracle's 1-5 difficulty level. `now` is the evaluation instant used for
/// the item's age.
pub fn calculate(
    item: &Item,
    decay: DecayInfo,
    comment_score: f64,
    difficulty: u8,
    user_level: UserLevel,
    now: DateTime<Utc>,
) -> Result<ScoreRecord> {
    if !decay.rate.is_finite() || decay.rate <= 0.0 {
        return Err(ScoreError::InvalidDecayRate(decay.rate));
    }
    if !comment_score.is_finite() {
        return Err(ScoreError::InvalidCommentQuality(comment_score));
    }

    let age = age_years(item.published_at, now);

    let scores = SubScores {
        engagement: engagement(item.views, item.likes, item.dislikes),
        relevance: relevance(decay.rate, age),
        comment_quality: comment_quality(comment_score),
        subject_complexity: SUBJECT_COMPLEXITY,
        difficulty_alignment: difficulty_alignment(difficulty, user_level),
    };
    let weights = WeightSet::for_category(decay.category);

    let total = composite_total(&scores, &weights);
    if !total.is_finite() {
        return Err(ScoreError::NonFiniteScore(item.id.clone()));
    }

    Ok(ScoreRecord {
        item: item.clone(),
        total: round1(total),
        scores: SubScores {
            engagement: round1(scores.engagement),
            relevance: round1(scores.relevance),
            comment_quality: round1(scores.comment_quality),
            subject_complexity: round1(scores.subject_complexity),
            difficulty_alignment: round1(scores.difficulty_alignment),
        },
        weights,
        category: decay.category,
        age_years: round1(age),
    })
}
