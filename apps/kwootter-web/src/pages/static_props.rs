//! Props built on a page's first request and reused until revalidated.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use kwootter_core::ports::Cache;

use super::PageBuildError;

const KEY_PREFIX: &str = "static:";

/// Page props keyed by path, built on demand and kept until [`StaticPropsStore::revalidate`].
pub struct StaticPropsStore {
    cache: Arc<dyn Cache>,
}

impl StaticPropsStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    fn key(path: &str) -> String {
        format!("{KEY_PREFIX}{path}")
    }

    /// Stored props for `path`, or the result of `build`. Built props are stored only when
    /// `keep` accepts them; errors are never stored.
    pub async fn get_or_build<P, F, Fut>(
        &self,
        path: &str,
        keep: impl Fn(&P) -> bool,
        build: F,
    ) -> Result<P, PageBuildError>
    where
        P: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P, PageBuildError>>,
    {
        let key = Self::key(path);

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str(&raw) {
                Ok(props) => return Ok(props),
                Err(e) => tracing::warn!(%path, error = %e, "Discarding unreadable static props"),
            }
        }

        let props = build().await?;

        if keep(&props) {
            let raw =
                serde_json::to_string(&props).map_err(|e| PageBuildError::Corrupt(e.to_string()))?;
            if let Err(e) = self.cache.set(&key, &raw, None).await {
                tracing::warn!(%path, error = %e, "Failed to store static props");
            } else {
                tracing::debug!(%path, "Static props built");
            }
        }

        Ok(props)
    }

    /// Drop the stored props for `path` so the next request rebuilds them.
    pub async fn revalidate(&self, path: &str) -> bool {
        match self.cache.delete(&Self::key(path)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%path, error = %e, "Failed to revalidate static props");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwootter_core::ApiError;
    use kwootter_infra::InMemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> StaticPropsStore {
        StaticPropsStore::new(Arc::new(InMemoryCache::new()))
    }

    #[tokio::test]
    async fn test_builds_once_until_revalidated() {
        let store = store();
        let counter = AtomicUsize::new(0);
        let builds = &counter;
        let build = move || async move {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PageBuildError>("props".to_string())
        };

        assert_eq!(store.get_or_build("/@alice", |_| true, build).await.unwrap(), "props");
        assert_eq!(store.get_or_build("/@alice", |_| true, build).await.unwrap(), "props");
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        assert!(store.revalidate("/@alice").await);
        store.get_or_build("/@alice", |_| true, build).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_props_are_rebuilt() {
        let store = store();
        let counter = AtomicUsize::new(0);
        let builds = &counter;
        let build = move || async move {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PageBuildError>(None::<String>)
        };

        store.get_or_build("/@ghost", Option::is_some, build).await.unwrap();
        store.get_or_build("/@ghost", Option::is_some, build).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_stored() {
        let store = store();
        let failed = store
            .get_or_build("/@bob", |_| true, || async {
                Err::<String, _>(PageBuildError::Prefetch(ApiError::Transport("down".into())))
            })
            .await;
        assert!(failed.is_err());

        let ok = store
            .get_or_build("/@bob", |_| true, || async { Ok("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(ok, "fresh");
    }
}
