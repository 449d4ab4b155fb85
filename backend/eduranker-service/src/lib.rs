pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use services::{EnrichmentOrchestrator, ItemSource, RankingEngine};
