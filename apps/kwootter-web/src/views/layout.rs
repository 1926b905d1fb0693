//! Page shell.

use super::escape;

const STYLES: &str = r#"
*,*::before,*::after{box-sizing:border-box}
body{margin:0;min-height:100vh;font-family:system-ui,sans-serif;color:#fff;background:linear-gradient(to bottom,#2e026d,#15162c)}
a{color:inherit;text-decoration:none}
.shell{display:flex;justify-content:center;min-height:100vh}
.column{width:100%;max-width:42rem;min-height:100%;border-left:1px solid #64748b;border-right:1px solid #64748b}
.compose-bar{display:flex;border-bottom:1px solid #64748b;padding:1rem}
.compose{display:flex;width:100%;gap:.75rem}
.compose-form{display:flex;flex-grow:1;gap:.75rem}
.compose-form input{flex-grow:1;background:transparent;border:0;outline:none;color:inherit;font-size:1rem}
.compose-submit{background:transparent;border:0;color:inherit;cursor:pointer}
.avatar{width:3.5rem;height:3.5rem;border-radius:9999px}
.post{display:flex;gap:.75rem;border-bottom:1px solid #64748b;padding:1rem}
.post-body{display:flex;flex-direction:column}
.post-meta{display:flex;gap:.25rem;color:#cbd5e1}
.post-time{font-weight:300}
.post-content{font-size:1.5rem}
.feed-empty,.feed-error,.placeholder{padding:1rem}
.toast{position:fixed;top:1rem;left:50%;transform:translateX(-50%);padding:.75rem 1rem;border-radius:.5rem;background:#fff;color:#1e293b}
.toast-error{border-left:4px solid #dc2626}
.profile-banner{position:relative;height:12rem;background:#475569}
.profile-banner .avatar{position:absolute;bottom:0;left:0;margin-left:1rem;margin-bottom:-4rem;width:8rem;height:8rem;border:4px solid #000;background:#000}
.profile-name{padding:5rem 1rem 1rem;font-size:1.5rem;font-weight:700;border-bottom:1px solid #94a3b8}
.loading-page{position:absolute;inset:0;display:flex;align-items:center;justify-content:center}
.spinner{display:inline-block;border:4px solid #e5e7eb;border-top-color:#4b5563;border-radius:9999px;animation:spin 1s linear infinite}
.sr-only{position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0,0,0,0)}
@keyframes spin{to{transform:rotate(360deg)}}
"#;

/// Full HTML document around `body`.
pub fn document(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head>",
            "<meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<meta name=\"description\" content=\"Kwootter\">",
            "<link rel=\"icon\" href=\"/favicon.ico\">",
            "<title>{title}</title><style>{styles}</style></head>",
            "<body>{body}</body></html>"
        ),
        title = escape(title),
        styles = STYLES,
        body = body,
    )
}

/// Centered, bordered, max-width column shared by every page.
pub fn page_layout(children: &str) -> String {
    format!(r#"<main class="shell"><div class="column">{children}</div></main>"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_escapes_title() {
        let html = document("<Kwootter>", "<p>hi</p>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>&lt;Kwootter&gt;</title>"));
        assert!(html.contains("<body><p>hi</p></body>"));
    }

    #[test]
    fn test_page_layout_wraps_children() {
        assert_eq!(
            page_layout("x"),
            r#"<main class="shell"><div class="column">x</div></main>"#
        );
    }
}
