//! In-memory repositories - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use kwootter_core::domain::{Post, User};
use kwootter_core::error::RepoError;
use kwootter_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Post store kept in process memory.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, limit: u64, keep: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let posts = self.posts.read().await;
        let mut selected: Vec<Post> = posts.iter().filter(|p| keep(p)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        selected
    }
}

#[async_trait]
impl BaseRepository<Post> for InMemoryPostRepository {
    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        posts.push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_recent(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        Ok(self.newest_first(limit, |_| true).await)
    }

    async fn find_by_author(&self, author_id: &str, limit: u64) -> Result<Vec<Post>, RepoError> {
        Ok(self.newest_first(limit, |p| p.author_id == author_id).await)
    }
}

/// User directory kept in process memory.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a fixed set of users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }
}

#[async_trait]
impl BaseRepository<User> for InMemoryUserRepository {
    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(RepoError::Constraint("Username already taken".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_posts_newest_first_and_limited() {
        let repo = InMemoryPostRepository::new();
        for minutes in [5, 1, 3] {
            let mut post = Post::new("user_a", format!("{minutes}m"));
            post.created_at = Utc::now() - Duration::minutes(minutes);
            repo.save(post).await.unwrap();
        }

        let recent = repo.find_recent(2).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["1m", "3m"]);
    }

    #[tokio::test]
    async fn test_posts_by_author() {
        let repo = InMemoryPostRepository::new();
        repo.save(Post::new("user_a", "mine")).await.unwrap();
        repo.save(Post::new("user_b", "theirs")).await.unwrap();

        let posts = repo.find_by_author("user_a", 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "mine");
    }

    #[tokio::test]
    async fn test_duplicate_post_rejected() {
        let repo = InMemoryPostRepository::new();
        let post = Post::new("user_a", "once");
        repo.save(post.clone()).await.unwrap();
        assert!(matches!(
            repo.save(post).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let repo = InMemoryUserRepository::with_users([
            User::new("user_a", "alice", "https://img/a.png"),
            User::new("user_b", "bob", "https://img/b.png"),
        ]);

        let alice = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.id, "user_a");
        assert!(repo.find_by_username("carol").await.unwrap().is_none());

        let found = repo
            .find_by_ids(&["user_b".to_string(), "user_x".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "bob");
        assert_eq!(repo.find_by_id("user_a").await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn test_save_user_keeps_usernames_unique() {
        let repo = InMemoryUserRepository::new();
        repo.save(User::new("user_a", "alice", "https://img/a.png"))
            .await
            .unwrap();

        assert!(matches!(
            repo.save(User::new("user_x", "alice", "https://img/x.png")).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(repo.find_by_id("user_x").await.unwrap().is_none());
    }
}
