//! Caching query client.
//!
//! Wraps any [`PostsApi`]/[`ProfileApi`] implementation with a result cache keyed by
//! operation name and arguments. Identical queries issued while one is already in flight
//! share its result instead of hitting the API twice. The in-flight table only holds weak
//! handles, so a query whose waiters all went away is dropped along with its request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use kwootter_core::domain::{Post, PostWithAuthor, User};
use kwootter_core::error::ApiError;
use kwootter_core::ports::{
    AuthSession, Cache, CreatePostInput, PostsApi, ProfileApi, QueryInvalidation,
};
use kwootter_shared::dto::ops;

type FetchFuture = BoxFuture<'static, Result<String, ApiError>>;
type SharedFetch = Shared<FetchFuture>;

struct InFlight {
    fetch: WeakShared<FetchFuture>,
    /// Invalidation generation the fetch started in.
    generation: u64,
}

/// Logical cache key: operation name plus its JSON arguments.
pub fn query_key(op: &str, input: &serde_json::Value) -> String {
    format!("{op}:{input}")
}

/// Client-side query cache in front of the API.
pub struct QueryClient {
    posts: Arc<dyn PostsApi>,
    profiles: Arc<dyn ProfileApi>,
    cache: Arc<dyn Cache>,
    ttl: Option<Duration>,
    in_flight: Mutex<HashMap<String, InFlight>>,
    generation: AtomicU64,
}

impl QueryClient {
    pub fn new(
        posts: Arc<dyn PostsApi>,
        profiles: Arc<dyn ProfileApi>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            posts,
            profiles,
            cache,
            ttl: None,
            in_flight: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Expire cached results after `ttl` even without an invalidation.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    async fn fetch<T, F>(&self, key: String, load: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> BoxFuture<'static, Result<T, ApiError>>,
    {
        if let Some(hit) = self.cache.get(&key).await {
            match serde_json::from_str(&hit) {
                Ok(value) => {
                    tracing::trace!(%key, "Query cache hit");
                    return Ok(value);
                }
                Err(e) => tracing::warn!(%key, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let fetch = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&key).and_then(|existing| existing.fetch.upgrade()) {
                Some(existing) => {
                    tracing::trace!(%key, "Joining in-flight query");
                    existing
                }
                None => {
                    // Forget queries nobody is waiting for any more.
                    in_flight.retain(|_, entry| entry.fetch.upgrade().is_some());

                    let request = load();
                    let fetch: SharedFetch = async move {
                        let value = request.await?;
                        serde_json::to_string(&value).map_err(|e| ApiError::Internal(e.to_string()))
                    }
                    .boxed()
                    .shared();
                    if let Some(weak) = fetch.downgrade() {
                        in_flight.insert(
                            key.clone(),
                            InFlight {
                                fetch: weak,
                                generation: self.generation.load(Ordering::SeqCst),
                            },
                        );
                    }
                    fetch
                }
            }
        };

        let result = fetch.clone().await;
        self.settle(&key, &fetch).await;

        let json = result?;
        serde_json::from_str(&json).map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Mark every cached result under `scope` stale, including ones still being fetched.
    pub async fn invalidate_scope(&self, scope: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.retain(|key, _| !key.starts_with(scope));
        }
        match self.cache.delete_prefix(scope).await {
            Ok(removed) => tracing::debug!(scope, removed, "Invalidated queries"),
            Err(e) => tracing::warn!(scope, error = %e, "Failed to invalidate queries"),
        }
    }

    /// Retire the finished `fetch`; the waiter that removes its entry stores the result.
    async fn settle(&self, key: &str, fetch: &SharedFetch) {
        let finished = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let ours = in_flight
                .get(key)
                .and_then(|entry| entry.fetch.upgrade())
                .is_some_and(|entry| entry.ptr_eq(fetch));
            if ours { in_flight.remove(key) } else { None }
        };

        let Some(entry) = finished else {
            return;
        };
        // Results that raced an invalidation are handed to their waiters but never stored.
        if entry.generation != self.generation.load(Ordering::SeqCst) {
            return;
        }
        if let Some(Ok(json)) = fetch.peek() {
            if let Err(e) = self.cache.set(key, json, self.ttl).await {
                tracing::warn!(%key, error = %e, "Failed to store query result");
            }
        }
    }
}

#[async_trait]
impl PostsApi for QueryClient {
    async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError> {
        let api = Arc::clone(&self.posts);
        self.fetch(query_key(ops::POSTS_GET_ALL, &json!(null)), move || {
            async move { api.get_all().await }.boxed()
        })
        .await
    }

    async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError> {
        let api = Arc::clone(&self.posts);
        let user_id = user_id.to_string();
        let key = query_key(ops::POSTS_GET_BY_USER_ID, &json!({ "userId": user_id }));
        self.fetch(key, move || {
            async move { api.get_posts_by_user_id(&user_id).await }.boxed()
        })
        .await
    }

    async fn create(
        &self,
        session: &AuthSession,
        input: CreatePostInput,
    ) -> Result<Post, ApiError> {
        self.posts.create(session, input).await
    }
}

#[async_trait]
impl ProfileApi for QueryClient {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let api = Arc::clone(&self.profiles);
        let username = username.to_string();
        let key = query_key(ops::PROFILE_GET_BY_USERNAME, &json!({ "username": username }));
        self.fetch(key, move || {
            async move { api.get_user_by_username(&username).await }.boxed()
        })
        .await
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let api = Arc::clone(&self.profiles);
        let user_id = user_id.to_string();
        let key = query_key(ops::PROFILE_GET_BY_ID, &json!({ "userId": user_id }));
        self.fetch(key, move || {
            async move { api.get_user_by_id(&user_id).await }.boxed()
        })
        .await
    }
}

#[async_trait]
impl QueryInvalidation for QueryClient {
    async fn invalidate_posts(&self) {
        self.invalidate_scope(ops::POSTS_SCOPE).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Fake API counting calls; `get_all` optionally waits for a release signal.
    struct CountingApi {
        calls: AtomicUsize,
        posts: Mutex<Vec<PostWithAuthor>>,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl CountingApi {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                posts: Mutex::new(Vec::new()),
                gate: None,
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn add(&self, content: &str) {
            let author = User::new("user_a", "alice", "https://img/a.png");
            self.posts.lock().unwrap().insert(
                0,
                PostWithAuthor {
                    post: Post::new(author.id.clone(), content),
                    author,
                },
            );
        }
    }

    #[async_trait]
    impl PostsApi for CountingApi {
        async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(self.posts.lock().unwrap().clone())
        }

        async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let posts = self.posts.lock().unwrap().clone();
            Ok(posts.into_iter().filter(|p| p.author.id == user_id).collect())
        }

        async fn create(
            &self,
            _session: &AuthSession,
            input: CreatePostInput,
        ) -> Result<Post, ApiError> {
            self.add(&input.content);
            Ok(self.posts.lock().unwrap()[0].post.clone())
        }
    }

    #[async_trait]
    impl ProfileApi for CountingApi {
        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((username == "alice").then(|| User::new("user_a", "alice", "https://img/a.png")))
        }

        async fn get_user_by_id(&self, _user_id: &str) -> Result<Option<User>, ApiError> {
            Ok(None)
        }
    }

    fn client(api: &Arc<CountingApi>) -> QueryClient {
        QueryClient::new(api.clone(), api.clone(), Arc::new(InMemoryCache::new()))
    }

    fn session() -> AuthSession {
        AuthSession {
            user_id: "user_a".to_string(),
            token: "t".to_string(),
        }
    }

    #[test]
    fn test_query_key_includes_arguments() {
        assert_eq!(query_key("posts.getAll", &json!(null)), "posts.getAll:null");
        assert_eq!(
            query_key("posts.getPostByUserId", &json!({ "userId": "u1" })),
            r#"posts.getPostByUserId:{"userId":"u1"}"#
        );
    }

    #[tokio::test]
    async fn test_second_query_served_from_cache() {
        let api = Arc::new(CountingApi::new());
        api.add("hello");
        let client = client(&api);

        assert_eq!(client.get_all().await.unwrap().len(), 1);
        assert_eq!(client.get_all().await.unwrap().len(), 1);
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_different_arguments_are_different_keys() {
        let api = Arc::new(CountingApi::new());
        let client = client(&api);

        client.get_posts_by_user_id("user_a").await.unwrap();
        client.get_posts_by_user_id("user_b").await.unwrap();
        client.get_posts_by_user_id("user_a").await.unwrap();
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_identical_queries_deduplicated() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(CountingApi {
            gate: Some(gate.clone()),
            ..CountingApi::new()
        });
        let client = client(&api);

        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (first, second, ()) = tokio::join!(client.get_all(), client.get_all(), release);

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_create_then_invalidate_refetches() {
        let api = Arc::new(CountingApi::new());
        let client = client(&api);

        assert!(client.get_all().await.unwrap().is_empty());

        client
            .create(&session(), CreatePostInput::new("new kwoot"))
            .await
            .unwrap();
        // Still cached until invalidated.
        assert!(client.get_all().await.unwrap().is_empty());

        client.invalidate_posts().await;
        let feed = client.get_all().await.unwrap();
        assert_eq!(feed[0].post.content, "new kwoot");
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent_and_scoped() {
        let api = Arc::new(CountingApi::new());
        let client = client(&api);

        client.get_user_by_username("alice").await.unwrap();
        client.invalidate_posts().await;
        client.invalidate_posts().await;
        client.get_user_by_username("alice").await.unwrap();

        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_result_racing_invalidation_not_cached() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(CountingApi {
            gate: Some(gate.clone()),
            ..CountingApi::new()
        });
        let client = client(&api);

        let invalidate_then_release = async {
            tokio::task::yield_now().await;
            client.invalidate_posts().await;
            gate.notify_one();
        };
        let (stale, ()) = tokio::join!(client.get_all(), invalidate_then_release);
        assert!(stale.is_ok());

        gate.notify_one();
        client.get_all().await.unwrap();
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_profile_scope_invalidation_refetches_lookups() {
        let api = Arc::new(CountingApi::new());
        let client = client(&api);

        client.get_all().await.unwrap();
        assert_eq!(client.get_user_by_username("nobody").await.unwrap(), None);
        client.invalidate_scope(ops::PROFILE_SCOPE).await;
        client.get_user_by_username("nobody").await.unwrap();
        client.get_all().await.unwrap();

        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_abandoned_query_is_forgotten() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(CountingApi {
            gate: Some(gate.clone()),
            ..CountingApi::new()
        });
        let client = client(&api);

        // The only waiter gives up while the request is still pending.
        let abandoned = tokio::time::timeout(Duration::from_millis(20), client.get_all()).await;
        assert!(abandoned.is_err());
        assert!(
            client
                .in_flight
                .lock()
                .unwrap()
                .values()
                .all(|entry| entry.fetch.upgrade().is_none())
        );

        client.get_user_by_username("alice").await.unwrap();
        assert!(client.in_flight.lock().unwrap().is_empty());

        // A later identical query starts a fresh request.
        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (feed, ()) = tokio::join!(client.get_all(), release);
        assert!(feed.is_ok());
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let api = Arc::new(CountingApi {
            fail: true,
            ..CountingApi::new()
        });
        let client = client(&api);

        assert!(matches!(client.get_all().await, Err(ApiError::Transport(_))));
        assert!(client.get_all().await.is_err());
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_user_cached_as_none() {
        let api = Arc::new(CountingApi::new());
        let client = client(&api);

        assert_eq!(client.get_user_by_username("nobody").await.unwrap(), None);
        assert_eq!(client.get_user_by_username("nobody").await.unwrap(), None);
        assert_eq!(api.calls(), 1);
    }
}
