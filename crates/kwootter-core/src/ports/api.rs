//! API ports - the operations the pages consume.
//!
//! Each page receives only the traits it needs, whether the implementation runs in process or
//! behind the RPC transport.

use std::borrow::Cow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::AuthSession;
use crate::domain::{Post, PostWithAuthor, User};
use crate::error::{ApiError, FieldErrors};

/// Input of `posts.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(
        custom(function = "not_blank"),
        length(min = 1, max = 280, message = "Post must be between 1 and 280 characters")
    )]
    pub content: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("Post cannot be empty")));
    }
    Ok(())
}

impl CreatePostInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Run the field rules, keyed by field name.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// `posts.*` operations.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// `posts.getAll` - global feed, newest first.
    async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError>;

    /// `posts.getPostByUserId` - one author's posts, newest first.
    async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError>;

    /// `posts.create` - requires a signed-in session.
    async fn create(&self, session: &AuthSession, input: CreatePostInput)
    -> Result<Post, ApiError>;
}

/// `profile.*` operations.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// `profile.getUserByUsername` - `Ok(None)` when nobody has that username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Directory lookup of the signed-in user, for the compose avatar.
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError>;
}

/// Client-side query cache control.
#[async_trait]
pub trait QueryInvalidation: Send + Sync {
    /// Mark every cached `posts.*` result stale. Safe to call repeatedly.
    async fn invalidate_posts(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_content() {
        assert!(CreatePostInput::new("hello 👋").check().is_ok());
    }

    #[test]
    fn test_rejects_whitespace_only() {
        let errors = CreatePostInput::new("   ").check().unwrap_err();
        assert_eq!(errors.first("content"), Some("Post cannot be empty"));
    }

    #[test]
    fn test_empty_reports_blank_first() {
        let errors = CreatePostInput::new("").check().unwrap_err();
        assert_eq!(errors.first("content"), Some("Post cannot be empty"));
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(CreatePostInput::new("🐦".repeat(280)).check().is_ok());

        let errors = CreatePostInput::new("a".repeat(281)).check().unwrap_err();
        assert_eq!(
            errors.first("content"),
            Some("Post must be between 1 and 280 characters")
        );
    }
}
