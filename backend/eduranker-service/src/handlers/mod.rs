/// Ranking API Handlers
///
/// HTTP endpoints for ETAS ranking:
/// - `POST /api/v1/rankings`: rank caller-supplied items
/// - `GET /api/v1/rankings`: rank items from the configured item source
/// - `GET /health`
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Item, RankingRequest, UserLevel};
use crate::services::{ItemSource, RankingEngine};

pub struct RankingHandlerState {
    pub engine: Arc<RankingEngine>,
    pub item_source: Arc<dyn ItemSource>,
    /// Candidates pulled from the item source per request
    pub batch_size: usize,
}

/// Query parameters for GET /api/v1/rankings
#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub topic: Option<String>,
    /// Learner level 1-5; anything unparsable means 3
    pub level: Option<String>,
}

/// Body for POST /api/v1/rankings
#[derive(Debug, Deserialize)]
pub struct RankItemsRequest {
    pub topic: Option<String>,
    /// Number or string
    #[serde(default)]
    pub level: Option<Value>,
    /// Raw items; each one is decoded on its own so a malformed item only drops itself
    #[serde(default)]
    pub items: Vec<Value>,
}

fn level_from_value(level: Option<&Value>) -> UserLevel {
    match level {
        Some(Value::Number(n)) => n.as_i64().map(UserLevel::new).unwrap_or_default(),
        Some(Value::String(s)) => UserLevel::parse(s),
        _ => UserLevel::default(),
    }
}

async fn run_ranking(engine: &RankingEngine, request: RankingRequest) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let span = info_span!("ranking_request", %request_id, topic = %request.topic);

    let response = engine.rank(request).instrument(span).await;
    HttpResponse::Ok().json(response)
}

/// POST /api/v1/rankings
#[post("/api/v1/rankings")]
pub async fn rank_items(
    state: web::Data<RankingHandlerState>,
    body: web::Json<RankItemsRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let user_level = level_from_value(body.level.as_ref());
    let items = Item::decode_each(body.items);

    let request = RankingRequest::new(body.topic.as_deref(), user_level, items);
    Ok(run_ranking(&state.engine, request).await)
}

/// GET /api/v1/rankings
#[get("/api/v1/rankings")]
pub async fn rank_topic(
    state: web::Data<RankingHandlerState>,
    query: web::Query<RankingQuery>,
) -> Result<HttpResponse> {
    let user_level = query
        .level
        .as_deref()
        .map(UserLevel::parse)
        .unwrap_or_default();

    // Resolve the topic first so the item source sees the same default
    let request = RankingRequest::new(query.topic.as_deref(), user_level, Vec::new());
    let items = state
        .item_source
        .candidates(&request.topic, state.batch_size)
        .await?;

    let request = RankingRequest { items, ..request };
    Ok(run_ranking(&state.engine, request).await)
}

/// GET /health
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());

    cfg.app_data(json_config)
        .service(rank_items)
        .service(rank_topic)
        .service(health);
}
