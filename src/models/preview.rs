//! Preview content kinds and load outcomes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{PageSession, PreviewConfig};

/// The two kinds of content the site previews on other pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Articles,
    Events,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Articles, ContentKind::Events];

    /// Id of the placeholder element that receives the cards.
    pub fn container_id(self) -> &'static str {
        match self {
            ContentKind::Articles => "articles-preview",
            ContentKind::Events => "events-preview",
        }
    }

    /// Class selector for one card in the source page.
    pub fn selector(self) -> &'static str {
        match self {
            ContentKind::Articles => ".article-card",
            ContentKind::Events => ".event-item",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Articles => write!(f, "articles"),
            ContentKind::Events => write!(f, "events"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "articles" => Ok(ContentKind::Articles),
            "events" => Ok(ContentKind::Events),
            other => Err(AppError::validation(format!("unknown content kind '{other}'"))),
        }
    }
}

/// How many cards a container may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cap {
    /// Bounded on the home page, every match elsewhere
    HomeOnly(usize),
    /// Bounded on every page
    Always(usize),
}

/// Everything one preview population needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSpec {
    pub kind: ContentKind,
    pub container_id: String,
    pub source: String,
    pub selector: String,
    pub fallback: String,
    pub cap: Cap,
    /// Re-run the translation pass after injecting cards
    pub retranslate: bool,
}

impl PreviewSpec {
    pub fn for_kind(kind: ContentKind, config: &PreviewConfig) -> Self {
        match kind {
            ContentKind::Articles => Self {
                kind,
                container_id: kind.container_id().to_string(),
                source: config.articles_source.clone(),
                selector: kind.selector().to_string(),
                fallback: config.articles_fallback.clone(),
                cap: Cap::HomeOnly(config.articles_to_show),
                retranslate: true,
            },
            ContentKind::Events => Self {
                kind,
                container_id: kind.container_id().to_string(),
                source: config.events_source.clone(),
                selector: kind.selector().to_string(),
                fallback: config.events_fallback.clone(),
                cap: Cap::Always(config.events_to_show),
                retranslate: false,
            },
        }
    }

    /// Number of cards to show given `available` matches on this page.
    pub fn effective_cap(&self, session: &PageSession, available: usize) -> usize {
        let cap = match self.cap {
            Cap::HomeOnly(n) if session.is_home() => n,
            Cap::HomeOnly(_) => available,
            Cap::Always(n) => n,
        };
        cap.min(available)
    }
}

/// How a single preview population ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PreviewOutcome {
    /// The page has no container for this kind
    MissingTarget,
    /// Cards were injected
    Populated { shown: usize, available: usize },
    /// The source page had no matching cards
    Empty,
    /// Every fetch attempt failed
    FetchFailed { error: String },
}

impl PreviewOutcome {
    pub fn shown(&self) -> usize {
        match self {
            PreviewOutcome::Populated { shown, .. } => *shown,
            _ => 0,
        }
    }
}
