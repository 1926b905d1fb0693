//! # Kwootter Infrastructure
//!
//! Concrete implementations of the ports defined in `kwootter-core`.
//! This crate contains the post store, the query cache, session verification and the API clients.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT session tokens
//! - `rate-limit` - Per-author post rate limiting via governor
//! - `http-client` - RPC client for a remote Kwootter API

pub mod cache;
pub mod client;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use client::QueryClient;
pub use database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "http-client")]
pub use client::{HttpApiClient, HttpClientConfig};
