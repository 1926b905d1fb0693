//! Loading indicators.

/// Accessible spinner of `size` pixels.
pub fn loading_spinner(size: u32) -> String {
    format!(
        r#"<div role="status" class="spinner" style="width:{size}px;height:{size}px"><span class="sr-only">Loading...</span></div>"#
    )
}

/// Full-viewport centered spinner.
pub fn loading_page() -> String {
    format!(r#"<div class="loading-page">{}</div>"#, loading_spinner(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_size() {
        let html = loading_spinner(20);
        assert!(html.contains("width:20px;height:20px"));
        assert!(html.contains(r#"role="status""#));
        assert!(html.contains("Loading..."));
    }

    #[test]
    fn test_loading_page_uses_large_spinner() {
        assert!(loading_page().contains("width:60px"));
    }
}
