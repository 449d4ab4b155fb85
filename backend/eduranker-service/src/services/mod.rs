pub mod enrichment;
pub mod items;
pub mod oracle;
pub mod ranking;
pub mod scoring;

pub use enrichment::EnrichmentOrchestrator;
pub use items::ItemSource;
pub use ranking::RankingEngine;
