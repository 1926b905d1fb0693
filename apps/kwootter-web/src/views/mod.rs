//! Server-rendered view components.
//!
//! Every component renders to an HTML `String`. Text and attribute values from users go through
//! [`escape`] before they reach the markup.

mod compose;
mod feed;
mod layout;
mod loading;
mod post_view;
mod time;

pub use compose::{ComposeState, ComposeWidget, POST_FAILED_MESSAGE};
pub use feed::{FeedView, QueryState, SOMETHING_WENT_WRONG};
pub use layout::{document, page_layout};
pub use loading::{loading_page, loading_spinner};
pub use post_view::PostView;
pub use time::time_ago;

/// Escape text for use in HTML content and double- or single-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Path of a user's profile page.
pub fn profile_href(username: &str) -> String {
    format!("/@{}", urlencoding::encode(username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape("🙂 plain"), "🙂 plain");
    }

    #[test]
    fn test_profile_href_encodes() {
        assert_eq!(profile_href("alice"), "/@alice");
        assert_eq!(profile_href("a b"), "/@a%20b");
    }
}
