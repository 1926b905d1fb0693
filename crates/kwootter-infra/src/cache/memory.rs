//! Process-local cache behind the query client and the static props store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use kwootter_core::ports::{Cache, CacheError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now <= at)
    }
}

/// `HashMap` under an async `RwLock`. Expired entries read as missing and are swept on the
/// next write.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("posts.getAll:null", "[]", None).await.unwrap();
        assert_eq!(cache.get("posts.getAll:null").await.as_deref(), Some("[]"));

        cache.delete("posts.getAll:null").await.unwrap();
        assert!(cache.get("posts.getAll:null").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_missing() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "v", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("short").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = InMemoryCache::new();
        cache.set("posts.getAll:null", "a", None).await.unwrap();
        cache
            .set("posts.getPostByUserId:{\"userId\":\"u1\"}", "b", None)
            .await
            .unwrap();
        cache
            .set("profile.getUserByUsername:{\"username\":\"alice\"}", "c", None)
            .await
            .unwrap();

        assert_eq!(cache.delete_prefix("posts.").await.unwrap(), 2);
        assert!(cache.get("posts.getAll:null").await.is_none());
        assert!(
            cache
                .get("profile.getUserByUsername:{\"username\":\"alice\"}")
                .await
                .is_some()
        );
    }
}
