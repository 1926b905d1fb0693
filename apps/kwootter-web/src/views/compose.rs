//! Post composer for the signed-in viewer.

use kwootter_core::ApiError;
use kwootter_core::domain::Post;
use kwootter_core::ports::{AuthSession, CreatePostInput, PostsApi, QueryInvalidation};

use super::{escape, loading_spinner};

/// Shown when a failed submission carries no message for the content field.
pub const POST_FAILED_MESSAGE: &str = "Failed to post. Please try again later.";

/// Toggles the submit button as the input empties and fills.
const TOGGLE_SUBMIT: &str = "var b=this.form.querySelector('button');if(b){var e=this.value.trim()==='';b.hidden=e;b.disabled=e;}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Idle,
    Submitting,
}

/// Text input plus submit control. The input is cleared only after a successful create.
#[derive(Debug, Clone)]
pub struct ComposeWidget {
    input: String,
    state: ComposeState,
    notification: Option<String>,
}

impl Default for ComposeWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeWidget {
    pub fn new() -> Self {
        Self::with_input("")
    }

    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            state: ComposeState::Idle,
            notification: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> ComposeState {
        self.state
    }

    /// Error toast from the last failed submission.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        self.state == ComposeState::Idle && !self.input.trim().is_empty()
    }

    /// Idle to Submitting. `None` when there is nothing to submit.
    pub fn begin_submit(&mut self) -> Option<CreatePostInput> {
        if !self.can_submit() {
            return None;
        }
        self.state = ComposeState::Submitting;
        self.notification = None;
        Some(CreatePostInput::new(self.input.clone()))
    }

    pub fn succeed(&mut self) {
        self.input.clear();
        self.state = ComposeState::Idle;
    }

    /// Back to Idle with the input kept and the first content error (or the fallback) raised.
    pub fn fail(&mut self, error: &ApiError) {
        let message = error
            .field_error("content")
            .map(str::to_string)
            .unwrap_or_else(|| POST_FAILED_MESSAGE.to_string());
        self.notification = Some(message);
        self.state = ComposeState::Idle;
    }

    /// Drive one submission through `posts`. On success every `posts.*` query is invalidated.
    ///
    /// Returns `None` when the widget could not submit.
    pub async fn submit(
        &mut self,
        session: &AuthSession,
        posts: &dyn PostsApi,
        queries: &dyn QueryInvalidation,
    ) -> Option<Result<Post, ApiError>> {
        let input = self.begin_submit()?;

        match posts.create(session, input).await {
            Ok(post) => {
                self.succeed();
                queries.invalidate_posts().await;
                Some(Ok(post))
            }
            Err(e) => {
                tracing::info!(user_id = %session.user_id, error = %e, "Post submission failed");
                self.fail(&e);
                Some(Err(e))
            }
        }
    }

    /// `avatar_url` is the viewer's profile image.
    pub fn render(&self, avatar_url: Option<&str>) -> String {
        let avatar = avatar_url
            .map(|url| {
                format!(
                    r#"<img src="{}" alt="Profile image" class="avatar" width="56" height="56">"#,
                    escape(url)
                )
            })
            .unwrap_or_default();

        let submitting = self.state == ComposeState::Submitting;
        let control = if submitting {
            format!(r#"<div class="compose-spinner">{}</div>"#, loading_spinner(20))
        } else if self.can_submit() {
            r#"<button type="submit" class="compose-submit">Post</button>"#.to_string()
        } else {
            r#"<button type="submit" class="compose-submit" hidden disabled>Post</button>"#
                .to_string()
        };

        let toast = self
            .notification
            .as_deref()
            .map(|msg| format!(r#"<div class="toast toast-error" role="alert">{}</div>"#, escape(msg)))
            .unwrap_or_default();

        format!(
            concat!(
                r#"<div class="compose">{avatar}"#,
                r#"<form method="post" action="/" class="compose-form">"#,
                r#"<input type="text" name="content" placeholder="Type some emojis!" autocomplete="off" value="{value}" oninput="{toggle}"{disabled}>"#,
                r#"{control}</form></div>{toast}"#
            ),
            avatar = avatar,
            value = escape(&self.input),
            toggle = TOGGLE_SUBMIT,
            disabled = if submitting { " disabled" } else { "" },
            control = control,
            toast = toast,
        )
    }
}
