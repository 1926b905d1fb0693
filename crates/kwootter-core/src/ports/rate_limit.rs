//! Posting rate limit port.

use std::time::Duration;

use async_trait::async_trait;

/// Outcome of counting one post against its author's allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Over the allowance until `retry_after` has passed.
    Limited { retry_after: Duration },
}

/// Counts posts per author.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one post by `author_id` and decide whether it may be stored.
    async fn record(&self, author_id: &str) -> Result<RateDecision, RateLimitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter unavailable: {0}")]
    Unavailable(String),
}
