//! Per-page-view session state.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::{page_path, resolve_url};

/// State that the site scripts kept in globals: which page is showing and
/// which language is active. Passed explicitly to every page behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSession {
    /// Path of the current page, e.g. `/articles.html`
    pub path: String,

    /// Active language code
    pub language: String,

    /// Language the markup is authored in
    pub default_language: String,

    /// Full address of the page, when it was fetched from one
    #[serde(skip)]
    pub url: Option<Url>,
}

impl PageSession {
    pub fn new(path: impl Into<String>, default_language: impl Into<String>) -> Self {
        let default_language = default_language.into();
        Self {
            path: path.into(),
            language: default_language.clone(),
            default_language,
            url: None,
        }
    }

    /// Session for a page served from `url`.
    pub fn for_url(url: &Url, default_language: impl Into<String>) -> Self {
        Self {
            url: Some(url.clone()),
            ..Self::new(page_path(url), default_language)
        }
    }

    /// Resolve a link the way the page itself would. Without a page URL the
    /// link is returned unchanged.
    pub fn resolve(&self, href: &str) -> String {
        match &self.url {
            Some(url) => resolve_url(url, href),
            None => href.to_string(),
        }
    }

    /// Page name: last path segment without `.html`, or `index`.
    pub fn page_name(&self) -> &str {
        let last = self.path.rsplit('/').next().unwrap_or("");
        let name = last.strip_suffix(".html").unwrap_or(last);
        if name.is_empty() { "index" } else { name }
    }

    /// Home page when the path names `index.html` or is the bare root.
    pub fn is_home(&self) -> bool {
        self.path.contains("index.html") || self.path == "/" || self.path.is_empty()
    }

    pub fn is_default_language(&self) -> bool {
        self.language == self.default_language
    }
}
