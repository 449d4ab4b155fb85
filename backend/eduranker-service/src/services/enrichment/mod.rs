/// Enrichment Orchestrator
///
/// Fans item scoring out over a bounded set of tasks and fans the results
/// back in, in submission order.
///
/// # Per-item pipeline
/// 1. Difficulty and comment-quality estimators, concurrently, each under its own timeout
/// 2. Score calculation
///
/// A timed-out estimator call is replaced by that estimator's fallback value.
/// Any other failure (estimator error, invalid score input, panic) drops only
/// the affected item.
use crate::models::{DecayInfo, Item, ScoreRecord, UserLevel};
use crate::services::oracle::{
    CommentQualityEstimator, DifficultyEstimator, OracleError, FALLBACK_COMMENT_QUALITY,
    FALLBACK_DIFFICULTY,
};
use crate::services::scoring::{self, ScoreError};
use crate::utils::with_timeout;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;
pub const DEFAULT_ESTIMATOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ItemProcessingError {
    #[error("Estimation failed: {0}")]
    Estimation(#[from] OracleError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoreError),
}

#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    difficulty: Arc<dyn DifficultyEstimator>,
    comments: Arc<dyn CommentQualityEstimator>,
    max_in_flight: usize,
    estimator_timeout: Duration,
}

impl EnrichmentOrchestrator {
    pub fn new(
        difficulty: Arc<dyn DifficultyEstimator>,
        comments: Arc<dyn CommentQualityEstimator>,
    ) -> Self {
        Self {
            difficulty,
            comments,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            estimator_timeout: DEFAULT_ESTIMATOR_TIMEOUT,
        }
    }

    /// Maximum number of items processed at once (at least 1)
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn with_estimator_timeout(mut self, timeout: Duration) -> Self {
        self.estimator_timeout = timeout;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Score every item, dropping the ones that fail. Output keeps input order.
    pub async fn enrich(
        &self,
        items: Vec<Item>,
        decay: DecayInfo,
        user_level: UserLevel,
    ) -> Vec<ScoreRecord> {
        let submitted = items.len();

        let outcomes: Vec<_> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let worker = self.clone();
                let item_id = item.id.clone();
                let handle = tokio::spawn(async move {
                    worker.process_item(item, decay, user_level).await
                });
                async move { (index, item_id, handle.await) }
            })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        let records: Vec<ScoreRecord> = outcomes
            .into_iter()
            .filter_map(|(index, item_id, outcome)| match outcome {
                Ok(Ok(record)) => Some(record),
                Ok(Err(e)) => {
                    error!(index, item_id = %item_id, error = %e, "Error processing item, dropping it");
                    None
                }
                Err(join_error) => {
                    error!(index, item_id = %item_id, error = %join_error, "Item task aborted, dropping it");
                    None
                }
            })
            .collect();

        info!(
            submitted,
            scored = records.len(),
            dropped = submitted - records.len(),
            "Enrichment complete"
        );

        records
    }

    async fn process_item(
        &self,
        item: Item,
        decay: DecayInfo,
        user_level: UserLevel,
    ) -> Result<ScoreRecord, ItemProcessingError> {
        let (difficulty, comment_score) = tokio::join!(
            with_timeout(
                self.estimator_timeout,
                self.difficulty
                    .estimate_difficulty(&item.title, &item.description),
            ),
            with_timeout(
                self.estimator_timeout,
                self.comments.estimate_comment_quality(&item.comments),
            ),
        );

        let difficulty = match difficulty {
            Ok(result) => result?,
            Err(elapsed) => {
                warn!(item_id = %item.id, error = %elapsed, "Difficulty estimation timed out, using fallback");
                FALLBACK_DIFFICULTY
            }
        };
        let comment_score = match comment_score {
            Ok(result) => result?,
            Err(elapsed) => {
                warn!(item_id = %item.id, error = %elapsed, "Comment quality estimation timed out, using fallback");
                FALLBACK_COMMENT_QUALITY
            }
        };

        let record = scoring::calculate(
            &item,
            decay,
            comment_score,
            difficulty,
            user_level,
            Utc::now(),
        )?;

        debug!(
            item_id = %item.id,
            difficulty,
            comment_score,
            total = record.total,
            "Item scored"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oracle::{Result as OracleResult, StubOracle};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| Item {
                id: format!("mock_video_{}", i),
                title: format!("Learn Rust - Part {}", i + 1),
                description: "A comprehensive tutorial".to_string(),
                channel: None,
                views: 1_000 * (i as u64 + 1),
                likes: 50,
                dislikes: 2,
                published_at: Utc::now() - ChronoDuration::days(30 * i as i64),
                comments: vec!["Great explanation".to_string()],
            })
            .collect()
    }

    fn ids(records: &[ScoreRecord]) -> Vec<String> {
        records.iter().map(|r| r.item.id.clone()).collect()
    }

    /// Fails for one title, sleeps a little longer for early items so they finish last
    struct FlakyDifficulty {
        failing_title: String,
    }

    #[async_trait]
    impl DifficultyEstimator for FlakyDifficulty {
        async fn estimate_difficulty(&self, title: &str, _description: &str) -> OracleResult<u8> {
            if title == self.failing_title {
                return Err(OracleError::Estimator("oracle exploded".to_string()));
            }
            let part: u64 = title.rsplit(' ').next().and_then(|n| n.parse().ok()).unwrap_or(1);
            tokio::time::sleep(std::time::Duration::from_millis(40 / part)).await;
            Ok(3)
        }
    }

    struct CountingDifficulty {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DifficultyEstimator for CountingDifficulty {
        async fn estimate_difficulty(&self, _title: &str, _description: &str) -> OracleResult<u8> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(2)
        }
    }

    struct SlowComments;

    #[async_trait]
    impl CommentQualityEstimator for SlowComments {
        async fn estimate_comment_quality(&self, _comments: &[String]) -> OracleResult<f64> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(10.0)
        }
    }

    struct PanickingComments;

    #[async_trait]
    impl CommentQualityEstimator for PanickingComments {
        async fn estimate_comment_quality(&self, comments: &[String]) -> OracleResult<f64> {
            if comments.iter().any(|c| c == "boom") {
                panic!("malformed comment payload");
            }
            Ok(6.0)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_failure_is_isolated_and_order_preserved() {
        let batch = items(8);
        let failing_title = batch[3].title.clone();
        let expected: Vec<String> = batch
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .map(|(_, item)| item.id.clone())
            .collect();

        let orchestrator = EnrichmentOrchestrator::new(
            Arc::new(FlakyDifficulty { failing_title }),
            Arc::new(StubOracle::default()),
        );

        let records = orchestrator
            .enrich(batch, DecayInfo::fallback(), UserLevel::default())
            .await;

        assert_eq!(records.len(), 7);
        assert_eq!(ids(&records), expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_is_bounded() {
        let counting = Arc::new(CountingDifficulty {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let orchestrator =
            EnrichmentOrchestrator::new(counting.clone(), Arc::new(StubOracle::default()));
        assert_eq!(orchestrator.max_in_flight(), 4);

        let records = orchestrator
            .enrich(items(12), DecayInfo::fallback(), UserLevel::default())
            .await;

        assert_eq!(records.len(), 12);
        let peak = counting.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak in-flight was {}", peak);
        assert!(peak >= 2, "items did not overlap (peak {})", peak);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_configured_bound_of_one_is_sequential() {
        let counting = Arc::new(CountingDifficulty {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let orchestrator = EnrichmentOrchestrator::new(counting.clone(), Arc::new(StubOracle::default()))
            .with_max_in_flight(0);

        let records = orchestrator
            .enrich(items(3), DecayInfo::fallback(), UserLevel::default())
            .await;

        assert_eq!(records.len(), 3);
        assert_eq!(counting.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_estimator_timeout_uses_fallback() {
        let orchestrator =
            EnrichmentOrchestrator::new(Arc::new(StubOracle::new(3, 9.0)), Arc::new(SlowComments))
                .with_estimator_timeout(std::time::Duration::from_millis(50));

        let records = orchestrator
            .enrich(items(2), DecayInfo::fallback(), UserLevel::default())
            .await;

        assert_eq!(records.len(), 2);
        for record in records {
            assert_eq!(record.scores.comment_quality, 50.0);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_item_is_dropped() {
        let mut batch = items(4);
        batch[1].comments = vec!["boom".to_string()];

        let orchestrator = EnrichmentOrchestrator::new(
            Arc::new(StubOracle::default()),
            Arc::new(PanickingComments),
        );

        let records = orchestrator
            .enrich(batch, DecayInfo::fallback(), UserLevel::default())
            .await;

        assert_eq!(ids(&records), vec!["mock_video_0", "mock_video_2", "mock_video_3"]);
    }

    #[tokio::test]
    async fn test_invalid_decay_rate_drops_items() {
        let orchestrator = EnrichmentOrchestrator::new(
            Arc::new(StubOracle::default()),
            Arc::new(StubOracle::default()),
        );
        let decay = DecayInfo {
            rate: f64::NAN,
            category: crate::models::DecayCategory::Fast,
        };

        let records = orchestrator.enrich(items(3), decay, UserLevel::default()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let orchestrator = EnrichmentOrchestrator::new(
            Arc::new(StubOracle::default()),
            Arc::new(StubOracle::default()),
        );
        let records = orchestrator
            .enrich(vec![], DecayInfo::fallback(), UserLevel::default())
            .await;
        assert!(records.is_empty());
    }
}
