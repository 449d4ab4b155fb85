use actix_web::{web, App, HttpServer};
use anyhow::Context;
use eduranker_service::handlers::{self, RankingHandlerState};
use eduranker_service::services::items::{JsonFileItemSource, UnconfiguredItemSource};
use eduranker_service::{Config, ItemSource, RankingEngine};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,actix_web=info".into()))
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_target(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        "Starting {} v{} on HTTP:{}",
        config.service.service_name,
        env!("CARGO_PKG_VERSION"),
        config.service.http_port
    );

    let engine = Arc::new(
        RankingEngine::from_config(&config).context("Failed to initialize ranking engine")?,
    );

    let item_source: Arc<dyn ItemSource> = match config.items.fixture_path.as_deref() {
        Some(path) => {
            info!(path, "Serving candidate items from file");
            Arc::new(JsonFileItemSource::new(path))
        }
        None => {
            warn!("ITEMS_FIXTURE_PATH not set - GET /api/v1/rankings is disabled");
            Arc::new(UnconfiguredItemSource)
        }
    };

    let state = web::Data::new(RankingHandlerState {
        engine,
        item_source,
        batch_size: config.ranking.batch_size,
    });

    let bind_addr = (config.service.http_host.clone(), config.service.http_port);
    info!("HTTP server listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
