//! Feed rendering over a query's state.

use chrono::{DateTime, Utc};
use kwootter_core::ApiError;
use kwootter_core::domain::PostWithAuthor;

use super::{PostView, loading_page};

/// Message shown in place of a feed whose query failed.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// State of a query as a view sees it.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Loading,
    Success(T),
    Error(ApiError),
}

impl<T> From<Result<T, ApiError>> for QueryState<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e),
        }
    }
}

/// List of posts with loading, error and empty states.
pub struct FeedView<'a> {
    state: &'a QueryState<Vec<PostWithAuthor>>,
    empty_message: &'a str,
    linked: bool,
}

impl<'a> FeedView<'a> {
    pub fn new(state: &'a QueryState<Vec<PostWithAuthor>>, empty_message: &'a str) -> Self {
        Self {
            state,
            empty_message,
            linked: false,
        }
    }

    /// Render each post with profile and post links.
    pub fn linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        match self.state {
            QueryState::Loading => loading_page(),
            QueryState::Error(e) => {
                tracing::warn!(error = %e, "Feed query failed");
                format!(r#"<div class="feed-error">{SOMETHING_WENT_WRONG}</div>"#)
            }
            QueryState::Success(items) if items.is_empty() => format!(
                r#"<div class="feed-empty">{}</div>"#,
                super::escape(self.empty_message)
            ),
            QueryState::Success(items) => {
                let rows: String = items
                    .iter()
                    .map(|item| PostView::new(item).linked(self.linked).render(now))
                    .collect();
                format!(r#"<div class="feed">{rows}</div>"#)
            }
        }
    }
}
