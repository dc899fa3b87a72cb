//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetching and retry behaviour
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Article and event preview settings
    #[serde(default)]
    pub previews: PreviewConfig,

    /// Intro overlay timings
    #[serde(default)]
    pub intro: IntroConfig,

    /// Scroll-driven typewriter settings
    #[serde(default)]
    pub typewriter: TypewriterConfig,

    /// Language selection
    #[serde(default)]
    pub i18n: I18nConfig,

    /// Translation tables, keyed by language code then element id
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.retries == 0 {
            return Err(AppError::validation("fetch.retries must be >= 1"));
        }
        if let Some(base) = &self.fetch.base_url {
            url::Url::parse(base)?;
        }
        if self.previews.articles_to_show == 0 || self.previews.events_to_show == 0 {
            return Err(AppError::validation(
                "previews.articles_to_show and previews.events_to_show must be >= 1",
            ));
        }
        if self.previews.articles_source.trim().is_empty()
            || self.previews.events_source.trim().is_empty()
        {
            return Err(AppError::validation("previews sources must not be empty"));
        }
        if self.typewriter.pixels_per_char <= 0.0 {
            return Err(AppError::validation(
                "typewriter.pixels_per_char must be > 0",
            ));
        }
        if !(self.typewriter.smoothing > 0.0 && self.typewriter.smoothing <= 1.0) {
            return Err(AppError::validation(
                "typewriter.smoothing must be in (0, 1]",
            ));
        }
        if !self
            .i18n
            .labels
            .values()
            .any(|code| *code == self.i18n.default_language)
        {
            return Err(AppError::validation(format!(
                "i18n.default_language '{}' has no label",
                self.i18n.default_language
            )));
        }
        Ok(())
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Total attempts per document, including the first
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Fixed pause between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Site root that relative page paths resolve against
    #[serde(default)]
    pub base_url: Option<String>,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retries: defaults::retries(),
            retry_delay_ms: defaults::retry_delay(),
            base_url: None,
        }
    }
}

/// Preview loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Article cards shown on the home page
    #[serde(default = "defaults::articles_to_show")]
    pub articles_to_show: usize,

    /// Event items shown wherever the events preview appears
    #[serde(default = "defaults::events_to_show")]
    pub events_to_show: usize,

    /// Page the article cards are read from
    #[serde(default = "defaults::articles_source")]
    pub articles_source: String,

    /// Page the event items are read from
    #[serde(default = "defaults::events_source")]
    pub events_source: String,

    /// Pause before re-translating freshly injected cards
    #[serde(default = "defaults::translation_delay")]
    pub translation_delay_ms: u64,

    #[serde(default = "defaults::articles_fallback")]
    pub articles_fallback: String,

    #[serde(default = "defaults::events_fallback")]
    pub events_fallback: String,

    /// Render fetch failures with a reload button instead of plain text
    #[serde(default)]
    pub retry_button: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            articles_to_show: defaults::articles_to_show(),
            events_to_show: defaults::events_to_show(),
            articles_source: defaults::articles_source(),
            events_source: defaults::events_source(),
            translation_delay_ms: defaults::translation_delay(),
            articles_fallback: defaults::articles_fallback(),
            events_fallback: defaults::events_fallback(),
            retry_button: false,
        }
    }
}

/// Intro overlay timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroConfig {
    #[serde(default = "defaults::intro_delay")]
    pub delay_ms: u64,

    #[serde(default = "defaults::intro_fade")]
    pub fade_ms: u64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            delay_ms: defaults::intro_delay(),
            fade_ms: defaults::intro_fade(),
        }
    }
}

/// Typewriter reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypewriterConfig {
    #[serde(default = "defaults::typewriter_message")]
    pub message: String,

    /// Scroll distance per revealed character; lower types faster
    #[serde(default = "defaults::pixels_per_char")]
    pub pixels_per_char: f64,

    /// Fraction of the remaining gap closed each frame
    #[serde(default = "defaults::smoothing")]
    pub smoothing: f64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            message: defaults::typewriter_message(),
            pixels_per_char: defaults::pixels_per_char(),
            smoothing: defaults::smoothing(),
        }
    }
}

/// Language selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "defaults::default_language")]
    pub default_language: String,

    /// Switcher label to language code, e.g. `FR = "fr"`
    #[serde(default = "defaults::labels")]
    pub labels: BTreeMap<String, String>,
}

impl I18nConfig {
    /// Language code for a switcher label.
    pub fn code_for_label(&self, label: &str) -> Option<&str> {
        self.labels.get(label.trim()).map(String::as_str)
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: defaults::default_language(),
            labels: defaults::labels(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pagewire/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn retries() -> u32 {
        2
    }
    pub fn retry_delay() -> u64 {
        1000
    }

    // Preview defaults
    pub fn articles_to_show() -> usize {
        3
    }
    pub fn events_to_show() -> usize {
        3
    }
    pub fn articles_source() -> String {
        "articles-list.html".into()
    }
    pub fn events_source() -> String {
        "events.html".into()
    }
    pub fn translation_delay() -> u64 {
        100
    }
    pub fn articles_fallback() -> String {
        "No articles available yet.".into()
    }
    pub fn events_fallback() -> String {
        "No upcoming events yet.".into()
    }

    // Intro defaults
    pub fn intro_delay() -> u64 {
        500
    }
    pub fn intro_fade() -> u64 {
        1000
    }

    // Typewriter defaults
    pub fn typewriter_message() -> String {
        "Did you know that everytime you scroll, click or tap, you hold power ?".into()
    }
    pub fn pixels_per_char() -> f64 {
        4.0
    }
    pub fn smoothing() -> f64 {
        0.15
    }

    // Language defaults
    pub fn default_language() -> String {
        "en".into()
    }
    pub fn labels() -> BTreeMap<String, String> {
        [
            ("EN", "en"),
            ("FR", "fr"),
            ("IT", "it"),
            ("ES", "es"),
            ("中文", "zh"),
        ]
        .into_iter()
        .map(|(label, code)| (label.to_string(), code.to_string()))
        .collect()
    }
}
