//! String cache port, shared by query results and page props.

use std::time::Duration;

use async_trait::async_trait;

/// Key/value store for serialized results. Keys are namespaced by prefix (`posts.`, `static:`).
#[async_trait]
pub trait Cache: Send + Sync {
    /// Live value under `key`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value`, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every key starting with `prefix`. Returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}
