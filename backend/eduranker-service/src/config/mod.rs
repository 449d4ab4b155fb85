use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub oracle: OracleConfig,
    pub ranking: RankingConfig,
    pub items: ItemSourceConfig,
}

/// HTTP_HOST, HTTP_PORT, SERVICE_NAME
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

/// GEMINI_* variables
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// RANKING_* variables
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_call_timeout_ms")]
    pub estimator_timeout_ms: u64,
    #[serde(default = "default_call_timeout_ms")]
    pub classifier_timeout_ms: u64,
    /// Candidates pulled from the item source per GET request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_true")]
    pub cache_decay: bool,
    /// Maximum number of cached topic classifications
    #[serde(default = "default_decay_cache_capacity")]
    pub decay_cache_capacity: u64,
    #[serde(default = "default_decay_cache_ttl_secs")]
    pub decay_cache_ttl_secs: u64,
}

/// ITEMS_* variables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemSourceConfig {
    #[serde(default)]
    pub fixture_path: Option<String>,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8012
}

fn default_service_name() -> String {
    "eduranker-service".to_string()
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_in_flight() -> usize {
    4
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

fn default_batch_size() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_decay_cache_capacity() -> u64 {
    1_000
}

fn default_decay_cache_ttl_secs() -> u64 {
    86_400
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            estimator_timeout_ms: default_call_timeout_ms(),
            classifier_timeout_ms: default_call_timeout_ms(),
            batch_size: default_batch_size(),
            cache_decay: default_true(),
            decay_cache_capacity: default_decay_cache_capacity(),
            decay_cache_ttl_secs: default_decay_cache_ttl_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            service: envy::from_env::<ServiceConfig>()?,
            oracle: envy::prefixed("GEMINI_").from_env::<OracleConfig>()?,
            ranking: envy::prefixed("RANKING_").from_env::<RankingConfig>()?,
            items: envy::prefixed("ITEMS_").from_env::<ItemSourceConfig>()?,
        })
    }
}
