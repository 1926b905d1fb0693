//! Profile page at `/@{username}`.
//!
//! The user lookup runs once per path and is kept as static props; the author's posts are
//! queried on every request through the query cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kwootter_core::domain::{PostWithAuthor, User};
use kwootter_core::ports::{PostsApi, ProfileApi};

use super::PageBuildError;
use crate::views::{FeedView, QueryState, document, escape, page_layout};

/// Shown when the user has not posted.
pub const EMPTY_PROFILE_FEED: &str = "User has no posts";

/// Body of the page for an unknown username.
pub const NOT_FOUND_BODY: &str = "404";

/// A route parameter as the router hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Username named by the slug, with one leading `@` removed.
pub fn username_from_slug(slug: Option<&ParamValue>) -> Result<String, PageBuildError> {
    match slug {
        None => Err(PageBuildError::MissingSlug),
        Some(ParamValue::Multiple(_)) => Err(PageBuildError::InvalidSlug),
        Some(ParamValue::Single(slug)) => Ok(slug.strip_prefix('@').unwrap_or(slug).to_string()),
    }
}

/// Props built on the first request for a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProps {
    pub username: String,
    /// Prefetched `profile.getUserByUsername` result.
    pub user: Option<User>,
}

impl ProfileProps {
    pub async fn build(
        slug: Option<&ParamValue>,
        profiles: &dyn ProfileApi,
    ) -> Result<Self, PageBuildError> {
        let username = username_from_slug(slug)?;
        let user = profiles.get_user_by_username(&username).await?;
        Ok(Self { username, user })
    }
}

pub enum ProfilePage {
    NotFound,
    Found {
        user: User,
        feed: QueryState<Vec<PostWithAuthor>>,
    },
}

impl ProfilePage {
    pub async fn load(props: ProfileProps, posts: &dyn PostsApi) -> Self {
        match props.user {
            None => Self::NotFound,
            Some(user) => {
                let feed = posts.get_posts_by_user_id(&user.id).await.into();
                Self::Found { user, feed }
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::NotFound => document(NOT_FOUND_BODY, &format!("<div>{NOT_FOUND_BODY}</div>")),
            Self::Found { user, feed } => {
                let username = escape(&user.username);
                let header = format!(
                    concat!(
                        r#"<div class="profile-banner">"#,
                        r#"<img src="{image}" alt="@{username}'s profile pic" class="avatar" width="128" height="128">"#,
                        r#"</div><div class="profile-name">@{username}</div>"#
                    ),
                    image = escape(&user.profile_image_url),
                    username = username,
                );
                let feed = FeedView::new(feed, EMPTY_PROFILE_FEED).linked(true).render(now);

                document(&user.username, &page_layout(&format!("{header}{feed}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwootter_core::ApiError;
    use kwootter_core::domain::Post;
    use kwootter_core::ports::{AuthSession, CreatePostInput};
    use std::sync::Mutex;

    struct Directory(Vec<User>);

    #[async_trait::async_trait]
    impl ProfileApi for Directory {
        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
            Ok(self.0.iter().find(|u| u.username == username).cloned())
        }

        async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
            Ok(self.0.iter().find(|u| u.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct Posts {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl PostsApi for Posts {
        async fn get_all(&self) -> Result<Vec<PostWithAuthor>, ApiError> {
            Ok(Vec::new())
        }

        async fn get_posts_by_user_id(&self, user_id: &str) -> Result<Vec<PostWithAuthor>, ApiError> {
            self.requested.lock().unwrap().push(user_id.to_string());
            Ok(Vec::new())
        }

        async fn create(&self, _: &AuthSession, _: CreatePostInput) -> Result<Post, ApiError> {
            Err(ApiError::Unauthorized)
        }
    }

    fn alice() -> User {
        User::new("user_1", "alice", "https://img.example/a.png")
    }

    #[test]
    fn test_username_from_slug() {
        let single = |s: &str| ParamValue::Single(s.to_string());

        assert_eq!(username_from_slug(Some(&single("@alice"))).unwrap(), "alice");
        assert_eq!(username_from_slug(Some(&single("alice"))).unwrap(), "alice");
        assert_eq!(username_from_slug(Some(&single("@@x"))).unwrap(), "@x");
        assert!(matches!(
            username_from_slug(None),
            Err(PageBuildError::MissingSlug)
        ));
        assert!(matches!(
            username_from_slug(Some(&ParamValue::Multiple(vec!["a".into(), "b".into()]))),
            Err(PageBuildError::InvalidSlug)
        ));
    }

    #[tokio::test]
    async fn test_props_prefetch_user() {
        let directory = Directory(vec![alice()]);
        let slug = ParamValue::Single("@alice".to_string());

        let props = ProfileProps::build(Some(&slug), &directory).await.unwrap();
        assert_eq!(props.username, "alice");
        assert_eq!(props.user, Some(alice()));
    }

    #[tokio::test]
    async fn test_found_page_queries_by_user_id() {
        let posts = Posts::default();
        let props = ProfileProps {
            username: "alice".to_string(),
            user: Some(alice()),
        };

        let page = ProfilePage::load(props, &posts).await;
        assert!(page.is_found());
        assert_eq!(posts.requested.lock().unwrap().as_slice(), ["user_1"]);

        let html = page.render(Utc::now());
        assert!(html.contains("<title>alice</title>"));
        assert!(html.contains(r#"<div class="profile-name">@alice</div>"#));
        assert!(html.contains("User has no posts"));
    }

    #[tokio::test]
    async fn test_unknown_user_renders_404() {
        let posts = Posts::default();
        let props = ProfileProps {
            username: "ghost".to_string(),
            user: None,
        };

        let page = ProfilePage::load(props, &posts).await;
        assert!(!page.is_found());
        assert!(posts.requested.lock().unwrap().is_empty());
        assert!(page.render(Utc::now()).contains("<div>404</div>"));
    }
}
