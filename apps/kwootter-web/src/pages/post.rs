//! Single post page. Accepts any id and renders a placeholder.

use crate::views::document;

pub fn render() -> String {
    document(
        "Post",
        r#"<main class="shell"><div class="placeholder">Post Page</div></main>"#,
    )
}
