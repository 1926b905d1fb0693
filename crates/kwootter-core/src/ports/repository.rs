use async_trait::async_trait;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Generic repository trait for append-only entities.
#[async_trait]
pub trait BaseRepository<T>: Send + Sync {
    /// Insert an entity.
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// The auth provider's user directory.
#[async_trait]
pub trait UserRepository: BaseRepository<User> {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Resolve many users at once. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>, RepoError>;
}

/// Post repository. Every listing is newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post> {
    async fn find_recent(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author(&self, author_id: &str, limit: u64) -> Result<Vec<Post>, RepoError>;
}
