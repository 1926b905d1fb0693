//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use kwootter_infra::database::DatabaseConfig;
use kwootter_infra::{HttpClientConfig, RateLimitConfig};

const DEFAULT_DEV_AVATAR_URL: &str = "https://www.gravatar.com/avatar/?d=identicon";

/// Settings the pages need beyond the API itself.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Where the sign-in affordance sends signed-out visitors.
    pub sign_in_url: String,
    /// Serve the built-in `/sign-in` page that issues sessions for directory users.
    pub dev_sign_in: bool,
    /// Avatar given to users registered by the built-in sign-in.
    pub dev_avatar_url: String,
    /// Shared secret for `POST /api/revalidate`; the endpoint is disabled without one.
    pub revalidate_secret: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sign_in_url: "/sign-in".to_string(),
            dev_sign_in: true,
            dev_avatar_url: DEFAULT_DEV_AVATAR_URL.to_string(),
            revalidate_secret: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Set when the pages consume a remote API instead of the in-process service.
    pub remote_api: Option<HttpClientConfig>,
    pub feed_limit: u64,
    pub post_rate_limit: RateLimitConfig,
    pub query_cache_ttl: Duration,
    pub site: SiteConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let remote_api = env::var("API_BASE_URL").ok().map(|base_url| HttpClientConfig {
            base_url,
            timeout: Duration::from_secs(parse_var("API_TIMEOUT_SECS").unwrap_or(10)),
        });

        let is_production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            remote_api,
            feed_limit: parse_var("FEED_LIMIT").unwrap_or(kwootter_core::services::DEFAULT_FEED_LIMIT),
            post_rate_limit: RateLimitConfig::from_env(),
            query_cache_ttl: Duration::from_secs(parse_var("QUERY_CACHE_TTL_SECS").unwrap_or(30)),
            site: SiteConfig {
                sign_in_url: env::var("AUTH_SIGN_IN_URL").unwrap_or_else(|_| "/sign-in".to_string()),
                dev_sign_in: env::var("AUTH_DEV_SIGN_IN")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(!is_production),
                dev_avatar_url: env::var("AUTH_DEV_AVATAR_URL")
                    .unwrap_or_else(|_| DEFAULT_DEV_AVATAR_URL.to_string()),
                revalidate_secret: env::var("REVALIDATE_SECRET").ok().filter(|s| !s.is_empty()),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
