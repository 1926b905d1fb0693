//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use kwootter_core::ports::{
    PostRepository, PostsApi, ProfileApi, RateLimiter, TokenService, UserRepository,
};
use kwootter_core::services::PostService;
use kwootter_infra::{
    HttpApiClient, InMemoryCache, InMemoryPostRepository, InMemoryRateLimiter,
    InMemoryUserRepository, JwtTokenService, QueryClient,
};

#[cfg(feature = "postgres")]
use kwootter_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

use crate::config::{AppConfig, SiteConfig};
use crate::pages::StaticPropsStore;

/// The API implementation the server answers with, in process or remote.
#[derive(Clone)]
pub struct Backend {
    pub posts: Arc<dyn PostsApi>,
    pub profiles: Arc<dyn ProfileApi>,
    /// Writable user directory; only present when the API is served in process.
    pub directory: Option<Arc<dyn UserRepository>>,
}

impl Backend {
    /// Serve the API from the given stores.
    pub fn in_process(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        limiter: Arc<dyn RateLimiter>,
        feed_limit: u64,
    ) -> Self {
        let service = Arc::new(
            PostService::new(posts, users.clone(), limiter).with_feed_limit(feed_limit),
        );
        Self {
            posts: service.clone(),
            profiles: service,
            directory: Some(users),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Answers the RPC endpoints.
    pub backend: Backend,
    /// Cached, deduplicated view of the backend used by the pages.
    pub queries: Arc<QueryClient>,
    pub static_props: Arc<StaticPropsStore>,
    pub tokens: Arc<dyn TokenService>,
    pub site: SiteConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        let backend = match &config.remote_api {
            Some(remote) => match HttpApiClient::new(remote.clone()) {
                Ok(client) => {
                    tracing::info!(base_url = %remote.base_url, "Using remote Kwootter API");
                    let client = Arc::new(client);
                    Some(Backend {
                        posts: client.clone(),
                        profiles: client,
                        directory: None,
                    })
                }
                Err(e) => {
                    tracing::error!("Failed to build API client: {}. Serving in process.", e);
                    None
                }
            },
            None => None,
        };

        let backend = match backend {
            Some(backend) => backend,
            None => Self::local_backend(config).await,
        };

        tracing::info!("Application state initialized");

        Self::from_parts(backend, tokens, config.site.clone(), config.query_cache_ttl)
    }

    /// Assemble state around an existing backend.
    pub fn from_parts(
        backend: Backend,
        tokens: Arc<dyn TokenService>,
        site: SiteConfig,
        query_ttl: Duration,
    ) -> Self {
        let queries = QueryClient::new(
            backend.posts.clone(),
            backend.profiles.clone(),
            Arc::new(InMemoryCache::new()),
        )
        .with_ttl(query_ttl);

        Self {
            backend,
            queries: Arc::new(queries),
            static_props: Arc::new(StaticPropsStore::new(Arc::new(InMemoryCache::new()))),
            tokens,
            site,
        }
    }

    async fn local_backend(config: &AppConfig) -> Backend {
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(config.post_rate_limit.clone()));

        #[cfg(feature = "postgres")]
        let (posts, users): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) = {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => (
                        Arc::new(PostgresPostRepository::new(connections.main.clone())),
                        Arc::new(PostgresUserRepository::new(connections.main)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        in_memory_stores()
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                in_memory_stores()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (posts, users) = {
            tracing::info!("Running without postgres feature - using in-memory stores");
            in_memory_stores()
        };

        Backend::in_process(posts, users, limiter, config.feed_limit)
    }
}

fn in_memory_stores() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}
