use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
use kwootter_core::domain::{Post, User};
use kwootter_core::ports::{BaseRepository, PostRepository, UserRepository};

fn post_row(author_id: &str, content: &str) -> post::Model {
    post::Model {
        id: uuid::Uuid::new_v4(),
        author_id: author_id.to_owned(),
        content: content.to_owned(),
        created_at: Utc::now().into(),
    }
}

fn user_row(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_owned(),
        username: username.to_owned(),
        profile_image_url: format!("https://img/{username}.png"),
        created_at: Utc::now().into(),
    }
}

#[tokio::test]
async fn test_find_user_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_row("user_a", "alice")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_id("user_a").await.unwrap().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.profile_image_url, "https://img/alice.png");
}

#[tokio::test]
async fn test_save_user_inserts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_row("user_b", "bob")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let saved = repo
        .save(User::new("user_b", "bob", "https://img/bob.png"))
        .await
        .unwrap();
    assert_eq!(saved.id, "user_b");
}

#[tokio::test]
async fn test_find_recent_keeps_row_order() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_row("user_a", "newest"),
            post_row("user_b", "older"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let posts = repo.find_recent(100).await.unwrap();
    let contents: Vec<&str> = posts.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["newest", "older"]);
}

#[tokio::test]
async fn test_find_recent_orders_by_created_at_desc() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    repo.find_recent(100).await.unwrap();

    let log = repo.db.into_transaction_log();
    let sql = format!("{:?}", log[0]);
    assert!(sql.contains("ORDER BY"));
    assert!(sql.contains("DESC"));
    assert!(sql.contains("LIMIT"));
}

#[tokio::test]
async fn test_save_post_inserts() {
    let post = Post::new("user_a", "hello");
    let stored = post::Model {
        id: post.id,
        author_id: post.author_id.clone(),
        content: post.content.clone(),
        created_at: post.created_at.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![stored]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = repo.save(post.clone()).await.unwrap();
    assert_eq!(saved.id, post.id);
    assert_eq!(saved.content, "hello");
}

#[tokio::test]
async fn test_find_user_by_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: "user_a".to_owned(),
            username: "alice".to_owned(),
            profile_image_url: "https://img/a.png".to_owned(),
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = repo.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(user.id, "user_a");
    assert_eq!(user.profile_image_url, "https://img/a.png");
}

#[tokio::test]
async fn test_find_by_ids_empty_skips_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresUserRepository::new(db);

    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
}
