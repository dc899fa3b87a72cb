//! Utility functions and helpers.

pub mod html;
pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Path component of a page URL, `/` when it has none.
pub fn page_path(url: &Url) -> String {
    match url.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/site/index.html").unwrap();
        assert_eq!(
            resolve_url(&base, "articles-list.html"),
            "https://example.com/site/articles-list.html"
        );
        assert_eq!(
            resolve_url(&base, "/events.html"),
            "https://example.com/events.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_page_path() {
        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(page_path(&url), "/");
        let url = Url::parse("https://example.com/articles.html?x=1").unwrap();
        assert_eq!(page_path(&url), "/articles.html");
    }
}
