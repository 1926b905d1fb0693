//! Home page: composer or sign-in link, then the global feed.

use chrono::{DateTime, Utc};

use kwootter_core::domain::PostWithAuthor;
use kwootter_core::ports::{PostsApi, ProfileApi};

use crate::views::{ComposeWidget, FeedView, QueryState, document, escape, page_layout};

/// Shown when the global feed is empty.
pub const EMPTY_FEED: &str = "No posts yet";

/// What the top bar shows.
#[derive(Debug, Clone)]
pub enum Viewer {
    SignedOut {
        sign_in_href: String,
    },
    SignedIn {
        avatar_url: Option<String>,
        compose: ComposeWidget,
    },
}

impl Viewer {
    /// Look up the signed-in viewer's avatar. A failed lookup only drops the avatar.
    pub async fn signed_in(profiles: &dyn ProfileApi, user_id: &str, compose: ComposeWidget) -> Self {
        let avatar_url = match profiles.get_user_by_id(user_id).await {
            Ok(user) => user.map(|u| u.profile_image_url),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Viewer lookup failed");
                None
            }
        };
        Self::SignedIn {
            avatar_url,
            compose,
        }
    }

    pub fn signed_out(sign_in_url: &str, return_to: &str) -> Self {
        Self::SignedOut {
            sign_in_href: sign_in_href(sign_in_url, return_to),
        }
    }
}

/// Sign-in link that returns to `return_to` afterwards.
pub fn sign_in_href(sign_in_url: &str, return_to: &str) -> String {
    let separator = if sign_in_url.contains('?') { '&' } else { '?' };
    format!(
        "{sign_in_url}{separator}redirect_url={}",
        urlencoding::encode(return_to)
    )
}

pub struct HomePage {
    pub viewer: Viewer,
    pub feed: QueryState<Vec<PostWithAuthor>>,
}

impl HomePage {
    pub async fn load(posts: &dyn PostsApi, viewer: Viewer) -> Self {
        Self {
            viewer,
            feed: posts.get_all().await.into(),
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let top = match &self.viewer {
            Viewer::SignedOut { sign_in_href } => format!(
                r#"<div class="sign-in"><a href="{}">Sign in</a></div>"#,
                escape(sign_in_href)
            ),
            Viewer::SignedIn {
                avatar_url,
                compose,
            } => compose.render(avatar_url.as_deref()),
        };

        let feed = FeedView::new(&self.feed, EMPTY_FEED).linked(true).render(now);

        document(
            "Kwootter",
            &page_layout(&format!(r#"<div class="compose-bar">{top}</div>{feed}"#)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwootter_core::ApiError;
    use kwootter_core::domain::User;

    struct Profiles(Result<Option<User>, ApiError>);

    #[async_trait::async_trait]
    impl ProfileApi for Profiles {
        async fn get_user_by_username(&self, _: &str) -> Result<Option<User>, ApiError> {
            self.0.clone()
        }

        async fn get_user_by_id(&self, _: &str) -> Result<Option<User>, ApiError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_signed_out_shows_sign_in_link() {
        let page = HomePage {
            viewer: Viewer::signed_out("/sign-in", "/"),
            feed: QueryState::Success(Vec::new()),
        };
        let html = page.render(Utc::now());

        assert!(html.contains(r#"<a href="/sign-in?redirect_url=%2F">Sign in</a>"#));
        assert!(html.contains("No posts yet"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_sign_in_url_with_query() {
        assert_eq!(
            sign_in_href("https://auth.example/sign-in?app=k", "/@alice"),
            "https://auth.example/sign-in?app=k&redirect_url=%2F%40alice"
        );
    }

    #[tokio::test]
    async fn test_signed_in_shows_composer_with_avatar() {
        let profiles = Profiles(Ok(Some(User::new("user_1", "alice", "https://img.example/a.png"))));
        let viewer = Viewer::signed_in(&profiles, "user_1", ComposeWidget::new()).await;
        let page = HomePage {
            viewer,
            feed: QueryState::Success(Vec::new()),
        };
        let html = page.render(Utc::now());

        assert!(html.contains(r#"<form method="post" action="/""#));
        assert!(html.contains("https://img.example/a.png"));
        assert!(!html.contains("Sign in"));
    }

    #[tokio::test]
    async fn test_viewer_lookup_failure_keeps_composer() {
        let profiles = Profiles(Err(ApiError::Transport("down".into())));
        let viewer = Viewer::signed_in(&profiles, "user_1", ComposeWidget::new()).await;

        assert!(matches!(viewer, Viewer::SignedIn { avatar_url: None, .. }));
    }

    #[test]
    fn test_feed_error_is_inline() {
        let page = HomePage {
            viewer: Viewer::signed_out("/sign-in", "/"),
            feed: QueryState::Error(ApiError::Internal("boom".into())),
        };
        let html = page.render(Utc::now());

        assert!(html.contains("Something went wrong"));
        assert!(html.contains("Sign in"));
    }
}
