//! Data Transfer Objects - operation names and inputs of the RPC transport.

use serde::{Deserialize, Serialize};

/// Path prefix every operation is mounted under.
pub const RPC_PREFIX: &str = "/api/trpc";

/// Operation names, also used as query cache key prefixes.
pub mod ops {
    pub const POSTS_GET_ALL: &str = "posts.getAll";
    pub const POSTS_GET_BY_USER_ID: &str = "posts.getPostByUserId";
    pub const POSTS_CREATE: &str = "posts.create";
    pub const PROFILE_GET_BY_USERNAME: &str = "profile.getUserByUsername";
    pub const PROFILE_GET_BY_ID: &str = "profile.getUserById";

    /// Prefix shared by every `posts.*` operation.
    pub const POSTS_SCOPE: &str = "posts.";
    /// Prefix shared by every `profile.*` operation.
    pub const PROFILE_SCOPE: &str = "profile.";
}

/// Input of `posts.getPostByUserId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdInput {
    pub user_id: String,
}

/// Input of `profile.getUserByUsername`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameInput {
    pub username: String,
}

/// Body of `posts.create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}
