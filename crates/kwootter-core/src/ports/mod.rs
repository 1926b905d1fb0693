//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod api;
mod auth;
mod cache;
mod rate_limit;
mod repository;

pub use api::{CreatePostInput, PostsApi, ProfileApi, QueryInvalidation};
pub use auth::{AuthError, AuthSession, TokenClaims, TokenService};
pub use cache::{Cache, CacheError};
pub use rate_limit::{RateDecision, RateLimitError, RateLimiter};
pub use repository::{BaseRepository, PostRepository, UserRepository};
