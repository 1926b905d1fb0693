//! A single post row.

use chrono::{DateTime, Utc};
use kwootter_core::domain::PostWithAuthor;

use super::{escape, profile_href, time_ago};

/// Renders one post with its author.
///
/// With [`PostView::linked`], the author handle links to the profile page and the timestamp to
/// the post page.
#[derive(Debug, Clone, Copy)]
pub struct PostView<'a> {
    item: &'a PostWithAuthor,
    linked: bool,
}

impl<'a> PostView<'a> {
    pub fn new(item: &'a PostWithAuthor) -> Self {
        Self {
            item,
            linked: false,
        }
    }

    pub fn linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let PostWithAuthor { post, author } = self.item;
        let handle = format!("<span>@{}</span>", escape(&author.username));
        let time = format!(
            r#"<span class="post-time">· {}</span>"#,
            escape(&time_ago(now, post.created_at))
        );

        let (handle, time) = if self.linked {
            (
                format!(r#"<a href="{}">{handle}</a>"#, escape(&profile_href(&author.username))),
                format!(r#"<a href="/post/{}">{time}</a>"#, post.id),
            )
        } else {
            (handle, time)
        };

        format!(
            concat!(
                r#"<div class="post" data-post-id="{id}">"#,
                r#"<img src="{image}" alt="@{username}'s profile picture" class="avatar" width="56" height="56">"#,
                r#"<div class="post-body"><div class="post-meta">{handle}{time}</div>"#,
                r#"<span class="post-content">{content}</span></div></div>"#
            ),
            id = post.id,
            image = escape(&author.profile_image_url),
            username = escape(&author.username),
            handle = handle,
            time = time,
            content = escape(&post.content),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use kwootter_core::domain::{Post, User};

    fn item(content: &str) -> PostWithAuthor {
        let mut post = Post::new("user_1", content);
        post.created_at = Utc::now() - TimeDelta::minutes(5);
        PostWithAuthor {
            post,
            author: User::new("user_1", "alice", "https://img.example/alice.png"),
        }
    }

    #[test]
    fn test_renders_author_time_and_content() {
        let item = item("🙂🙂");
        let html = PostView::new(&item).render(Utc::now());

        assert!(html.contains("<span>@alice</span>"));
        assert!(html.contains("5 minutes ago"));
        assert!(html.contains(r#"<span class="post-content">🙂🙂</span>"#));
        assert!(html.contains(r#"src="https://img.example/alice.png""#));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_linked_variant() {
        let item = item("hi");
        let html = PostView::new(&item).linked(true).render(Utc::now());

        assert!(html.contains(r#"<a href="/@alice"><span>@alice</span></a>"#));
        assert!(html.contains(&format!(r#"<a href="/post/{}">"#, item.post.id)));
    }

    #[test]
    fn test_escapes_content() {
        let item = item("<b>bold</b>");
        let html = PostView::new(&item).render(Utc::now());
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
