//! `posts.*` and `profile.*` operations over the repositories.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Post, PostWithAuthor, User};
use crate::error::ApiError;
use crate::ports::{
    AuthSession, CreatePostInput, PostRepository, PostsApi, ProfileApi, RateDecision,
    RateLimiter, UserRepository,
};

/// Most posts a single feed query returns.
pub const DEFAULT_FEED_LIMIT: u64 = 100;

/// Answers the feed operations from the post store and the user directory.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    limiter: Arc<dyn RateLimiter>,
    feed_limit: u64,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            posts,
            users,
            limiter,
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }

    pub fn with_feed_limit(mut self, limit: u64) -> Self {
        self.feed_limit = limit;
        self
    }

    /// Pair each post with its author, keeping the post order.
    async fn attach_authors(&self, posts: Vec<Post>) -> Result<Vec<PostWithAuthor>, ApiError> {
        let mut ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();

        let authors: HashMap<String, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        posts
            .into_iter()
            .map(|post| match authors.get(&post.author_id) {
                Some(author) => Ok(PostWithAuthor {
                    author: author.clone(),
                    post,
                }),
                None => {
                    tracing::error!(post_id = %post.id, author_id = %post.author_id, "Author for post not found");
                    Err(ApiError::Internal("Author for post not found".to_string()))
                }
            })
            .collect()
    }
}

#[async_trait]
impl PostsApi for PostService {
    async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError> {
        let posts = self.posts.find_recent(self.feed_limit).await?;
        self.attach_authors(posts).await
    }

    async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError> {
        let posts = self.posts.find_by_author(user_id, self.feed_limit).await?;
        self.attach_authors(posts).await
    }

    async fn create(
        &self,
        session: &AuthSession,
        input: CreatePostInput,
    ) -> Result<Post, ApiError> {
        input.check().map_err(ApiError::Validation)?;

        match self.limiter.record(&session.user_id).await {
            Ok(RateDecision::Allowed) => {}
            Ok(RateDecision::Limited { retry_after }) => {
                tracing::warn!(
                    user_id = %session.user_id,
                    retry_after_secs = retry_after.as_secs(),
                    "Post rate limit exceeded"
                );
                return Err(ApiError::TooManyRequests);
            }
            Err(e) => tracing::error!(error = %e, "Rate limiter error, failing open"),
        }

        let post = self
            .posts
            .save(Post::new(session.user_id.clone(), input.content))
            .await?;
        tracing::info!(post_id = %post.id, author_id = %post.author_id, "Post created");

        Ok(post)
    }
}

#[async_trait]
impl ProfileApi for PostService {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.find_by_username(username).await?)
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.find_by_id(user_id).await?)
    }
}
