/// Ranking Module
///
/// - **Ranker**: orders score records by composite total
/// - **Engine**: full request pipeline (classify → enrich → rank)
pub mod engine;

pub use engine::RankingEngine;

use crate::models::ScoreRecord;

/// Sort records by total, highest first.
///
/// The sort is stable: equal totals keep their arrival order.
/// Note: NaN totals are treated as equal to anything
pub fn rank_records(mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    records.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records
}
