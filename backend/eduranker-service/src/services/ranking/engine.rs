/// Ranking Engine
///
/// Runs one ranking request end to end:
/// 1. Classify the topic's decay (once, before fan-out; fallback on failure)
/// 2. Enrich and score every candidate through the orchestrator
/// 3. Rank the surviving records
use super::rank_records;
use crate::config::Config;
use crate::models::{DecayInfo, RankingRequest, RankingResponse};
use crate::services::enrichment::EnrichmentOrchestrator;
use crate::services::oracle::{
    CachedDecayClassifier, DecayCache, DecayClassifier, GeminiProvider, OracleError,
    OracleEstimator, StubOracle,
};
use crate::utils::with_timeout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RankingEngine {
    classifier: Arc<dyn DecayClassifier>,
    orchestrator: EnrichmentOrchestrator,
    classifier_timeout: Duration,
}

impl RankingEngine {
    pub fn new(classifier: Arc<dyn DecayClassifier>, orchestrator: EnrichmentOrchestrator) -> Self {
        Self {
            classifier,
            orchestrator,
            classifier_timeout: DEFAULT_CLASSIFIER_TIMEOUT,
        }
    }

    pub fn with_classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier_timeout = timeout;
        self
    }

    /// Wire the engine from configuration.
    ///
    /// Uses the Gemini oracle when an API key is configured, the deterministic
    /// stub otherwise.
    pub fn from_config(config: &Config) -> Result<Self, OracleError> {
        let ranking = &config.ranking;

        let (classifier, orchestrator) =
            match config.oracle.api_key.as_deref().filter(|k| !k.is_empty()) {
                Some(api_key) => {
                    let provider = Arc::new(GeminiProvider::new(api_key, &config.oracle)?);
                    let estimator = Arc::new(OracleEstimator::new(provider)?);
                    info!(model = %config.oracle.model, "Using Gemini oracle");

                    let classifier: Arc<dyn DecayClassifier> = estimator.clone();
                    (
                        classifier,
                        EnrichmentOrchestrator::new(estimator.clone(), estimator),
                    )
                }
                None => {
                    warn!("GEMINI_API_KEY not set - using deterministic stub oracle");
                    let stub = Arc::new(StubOracle::default());

                    let classifier: Arc<dyn DecayClassifier> = stub.clone();
                    (classifier, EnrichmentOrchestrator::new(stub.clone(), stub))
                }
            };

        let classifier: Arc<dyn DecayClassifier> = if ranking.cache_decay {
            Arc::new(CachedDecayClassifier::new(
                classifier,
                Arc::new(DecayCache::with_limits(
                    ranking.decay_cache_capacity,
                    Duration::from_secs(ranking.decay_cache_ttl_secs),
                )),
            ))
        } else {
            classifier
        };

        let orchestrator = orchestrator
            .with_max_in_flight(ranking.max_in_flight)
            .with_estimator_timeout(Duration::from_millis(ranking.estimator_timeout_ms));

        Ok(Self::new(classifier, orchestrator)
            .with_classifier_timeout(Duration::from_millis(ranking.classifier_timeout_ms)))
    }

    /// Classify a topic; never fails
    pub async fn classify_topic(&self, topic: &str) -> DecayInfo {
        match with_timeout(self.classifier_timeout, self.classifier.classify(topic)).await {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => {
                warn!(topic, error = %e, "Decay classification failed, using fallback");
                DecayInfo::fallback()
            }
            Err(elapsed) => {
                warn!(topic, error = %elapsed, "Decay classification timed out, using fallback");
                DecayInfo::fallback()
            }
        }
    }

    /// Rank a batch of candidates. Always returns a (possibly empty) ranked list.
    pub async fn rank(&self, request: RankingRequest) -> RankingResponse {
        let RankingRequest {
            topic,
            user_level,
            items,
        } = request;

        let decay = self.classify_topic(&topic).await;

        info!(
            topic = %topic,
            user_level = user_level.value(),
            category = %decay.category,
            rate = decay.rate,
            candidates = items.len(),
            "Ranking candidates"
        );

        let records = self.orchestrator.enrich(items, decay, user_level).await;
        let results = rank_records(records);

        RankingResponse {
            topic,
            decay_rate: decay.rate,
            decay_category: decay.category,
            user_level,
            results,
        }
    }
}
