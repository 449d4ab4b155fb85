use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Candidate learning item (e.g. a video) supplied by the item source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
    #[serde(deserialize_with = "deserialize_published_at")]
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Item {
    /// Decode raw JSON items one by one. A malformed entry is logged and
    /// skipped; the rest of the batch survives.
    pub fn decode_each(raw: Vec<Value>) -> Vec<Item> {
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<Item>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed item");
                    None
                }
            })
            .collect()
    }
}

/// Accepts RFC 3339 (`2021-03-04T10:00:00Z`) as well as naive ISO-8601
/// timestamps without offset, which are read as UTC.
fn deserialize_published_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    let naive = trimmed.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|dt| dt.and_utc())
        .map_err(|e| format!("invalid published_at '{}': {}", raw, e))
}

/// How quickly knowledge about a topic becomes outdated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecayCategory {
    Fast,
    Moderate,
    Slow,
    Timeless,
}

impl DecayCategory {
    /// Order in which category names are searched for in an oracle reply
    pub const ALL: [DecayCategory; 4] = [
        DecayCategory::Fast,
        DecayCategory::Moderate,
        DecayCategory::Slow,
        DecayCategory::Timeless,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecayCategory::Fast => "FAST",
            DecayCategory::Moderate => "MODERATE",
            DecayCategory::Slow => "SLOW",
            DecayCategory::Timeless => "TIMELESS",
        }
    }

    /// Canonical decay rate (per year) for the category
    pub fn rate(&self) -> f64 {
        match self {
            DecayCategory::Fast => 0.693,     // half-life ~1 year
            DecayCategory::Moderate => 0.347, // ~2 years
            DecayCategory::Slow => 0.139,     // ~5 years
            DecayCategory::Timeless => 0.035, // ~20 years
        }
    }
}

impl fmt::Display for DecayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decay rate and category for the topic of one ranking request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayInfo {
    pub rate: f64,
    pub category: DecayCategory,
}

impl DecayInfo {
    pub fn for_category(category: DecayCategory) -> Self {
        Self {
            rate: category.rate(),
            category,
        }
    }

    /// Deterministic result used whenever classification fails
    pub fn fallback() -> Self {
        Self::for_category(DecayCategory::Moderate)
    }
}

/// The five ETAS components, each on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// Engagement
    #[serde(rename = "E")]
    pub engagement: f64,
    /// Relevance (recency-decayed)
    #[serde(rename = "R")]
    pub relevance: f64,
    /// Comment quality
    #[serde(rename = "C")]
    pub comment_quality: f64,
    /// Subject complexity
    #[serde(rename = "S")]
    pub subject_complexity: f64,
    /// Difficulty alignment
    #[serde(rename = "D")]
    pub difficulty_alignment: f64,
}

impl SubScores {
    /// Components in weight order `(E, R, C, S, D)`
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.engagement,
            self.relevance,
            self.comment_quality,
            self.subject_complexity,
            self.difficulty_alignment,
        ]
    }
}

/// Per-category weights applied to `(E, R, C, S, D)`; always sums to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet([f64; 5]);

impl WeightSet {
    pub fn for_category(category: DecayCategory) -> Self {
        match category {
            // Fast moving topics lean on recency
            DecayCategory::Fast => Self([0.20, 0.35, 0.15, 0.10, 0.20]),
            // Math/physics: clarity of discussion and subject depth
            DecayCategory::Slow => Self([0.15, 0.10, 0.30, 0.25, 0.20]),
            // Philosophy: discussion and engagement
            DecayCategory::Timeless => Self([0.25, 0.05, 0.35, 0.15, 0.20]),
            DecayCategory::Moderate => Self([0.20, 0.20, 0.20, 0.20, 0.20]),
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Scored item, as reported to callers. Values are rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub item: Item,
    pub total: f64,
    #[serde(flatten)]
    pub scores: SubScores,
    pub weights: WeightSet,
    pub category: DecayCategory,
    pub age_years: f64,
}

/// Learner level on a 1 (beginner) to 5 (advanced) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserLevel(u8);

impl UserLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    /// Parses a raw request value; anything unparsable becomes the default level 3
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for UserLevel {
    fn default() -> Self {
        Self(3)
    }
}

pub const DEFAULT_TOPIC: &str = "Python Programming";

/// One ranking request: a topic, the learner's level and the candidates
#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub topic: String,
    pub user_level: UserLevel,
    pub items: Vec<Item>,
}

impl RankingRequest {
    pub fn new(topic: Option<&str>, user_level: UserLevel, items: Vec<Item>) -> Self {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOPIC)
            .to_string();

        Self {
            topic,
            user_level,
            items,
        }
    }
}

/// Ranked results plus the decay classification used to produce them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    pub topic: String,
    pub decay_rate: f64,
    pub decay_category: DecayCategory,
    pub user_level: UserLevel,
    pub results: Vec<ScoreRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_weight_sets_sum_to_one() {
        for category in DecayCategory::ALL {
            let sum = WeightSet::for_category(category).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} weights sum to {}", category, sum);
        }
    }

    #[test]
    fn test_weight_sets_are_distinct() {
        let sets: Vec<[f64; 5]> = DecayCategory::ALL
            .iter()
            .map(|c| WeightSet::for_category(*c).as_array())
            .collect();

        for i in 0..sets.len() {
            for j in (i + 1)..sets.len() {
                assert_ne!(sets[i], sets[j]);
            }
        }
    }

    #[test]
    fn test_decay_fallback() {
        let info = DecayInfo::fallback();
        assert_eq!(info.category, DecayCategory::Moderate);
        assert_eq!(info.rate, 0.347);
    }

    #[test]
    fn test_user_level_parse() {
        assert_eq!(UserLevel::parse("1").value(), 1);
        assert_eq!(UserLevel::parse(" 5 ").value(), 5);
        assert_eq!(UserLevel::parse("abc").value(), 3);
        assert_eq!(UserLevel::parse("").value(), 3);
        assert_eq!(UserLevel::parse("2.5").value(), 3);
        assert_eq!(UserLevel::parse("9").value(), 5);
        assert_eq!(UserLevel::parse("-4").value(), 1);
    }

    #[test]
    fn test_request_topic_default() {
        let req = RankingRequest::new(None, UserLevel::default(), vec![]);
        assert_eq!(req.topic, DEFAULT_TOPIC);

        let req = RankingRequest::new(Some("   "), UserLevel::default(), vec![]);
        assert_eq!(req.topic, DEFAULT_TOPIC);

        let req = RankingRequest::new(Some(" Basic Math "), UserLevel::default(), vec![]);
        assert_eq!(req.topic, "Basic Math");
    }

    #[test]
    fn test_item_decodes_naive_and_rfc3339_timestamps() {
        let naive: Item = serde_json::from_value(serde_json::json!({
            "id": "mock_video_0",
            "title": "Learn Rust",
            "published_at": "2021-06-01T12:30:00",
        }))
        .unwrap();
        assert_eq!(
            naive.published_at,
            Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap()
        );
        assert_eq!(naive.views, 0);
        assert!(naive.comments.is_empty());

        let zulu: Item = serde_json::from_value(serde_json::json!({
            "id": "mock_video_1",
            "title": "Learn Rust",
            "published_at": "2020-02-29T00:00:00.250Z",
            "views": 10,
            "comments": ["nice"],
        }))
        .unwrap();
        assert_eq!(zulu.published_at.year(), 2020);
        assert_eq!(zulu.comments, vec!["nice".to_string()]);
    }

    #[test]
    fn test_decode_each_skips_malformed() {
        let items = Item::decode_each(vec![
            serde_json::json!({"id": "a", "title": "A", "published_at": "2022-01-01T00:00:00"}),
            serde_json::json!({"id": "b", "title": "B", "views": -5, "published_at": "2022-01-01T00:00:00"}),
            serde_json::json!({"id": "c"}),
            serde_json::json!("not an object"),
            serde_json::json!({"id": "d", "title": "D", "published_at": "2023-01-01T00:00:00Z"}),
        ]);

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_item_rejects_bad_timestamp() {
        let result: Result<Item, _> = serde_json::from_value(serde_json::json!({
            "id": "x",
            "title": "t",
            "published_at": "last tuesday",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_score_record_serializes_short_component_names() {
        let record = ScoreRecord {
            item: Item {
                id: "v1".to_string(),
                title: "t".to_string(),
                description: String::new(),
                channel: None,
                views: 1,
                likes: 1,
                dislikes: 0,
                published_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
                comments: vec![],
            },
            total: 42.0,
            scores: SubScores {
                engagement: 1.0,
                relevance: 2.0,
                comment_quality: 3.0,
                subject_complexity: 90.0,
                difficulty_alignment: 80.0,
            },
            weights: WeightSet::for_category(DecayCategory::Fast),
            category: DecayCategory::Fast,
            age_years: 1.5,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["E"], 1.0);
        assert_eq!(value["S"], 90.0);
        assert_eq!(value["category"], "FAST");
        assert_eq!(value["weights"][1], 0.35);
        assert_eq!(value["item"]["id"], "v1");
    }
}
