// Utility functions for eduranker-service

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Round to one decimal place (reported score precision).
///
/// Rounds the exact binary value, so `0.15` (stored as 0.1499..) goes down;
/// exact ties such as `0.25` go to the even digit.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

#[derive(Debug, thiserror::Error)]
#[error("Operation timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Execute a future with a time limit
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    timeout(duration, future)
        .await
        .map_err(|_| Elapsed(duration))
}
