//! Reading-article pages: back, share and about buttons, the copy notice
//! and the hero image parallax.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::dom::{Document, ElementLookup, ElementQuery, Fragment, NodeId, PageEvent};
use crate::error::Result;
use crate::models::PageSession;
use crate::utils::http::Delay;

const HERO: &str = ".hero-image";
const ABOUT_PAGE: &str = "../about.html";
const SHARE_TEXT: &str = "Check out this article on Userism";
const COPY_NOTICE: &str = "Link copied to clipboard!";
const NOTICE_LIFETIME: Duration = Duration::from_millis(2000);
const PARALLAX_RATE: f64 = 0.5;

const NOTICE_KEYFRAMES: &str = "
    @keyframes fadeInOut {
        0% { opacity: 0; transform: translateX(-50%) translateY(10px); }
        15% { opacity: 1; transform: translateX(-50%) translateY(0); }
        85% { opacity: 1; transform: translateX(-50%) translateY(0); }
        100% { opacity: 0; transform: translateX(-50%) translateY(10px); }
    }
";

const NOTICE_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "100px"),
    ("left", "50%"),
    ("transform", "translateX(-50%)"),
    ("background-color", "#000"),
    ("color", "#fff"),
    ("padding", "12px 24px"),
    ("border-radius", "8px"),
    ("font-family", "'Inter', sans-serif"),
    ("font-size", "0.9rem"),
    ("font-weight", "500"),
    ("z-index", "1000"),
    ("animation", "fadeInOut 2s ease-in-out"),
];

/// What the page shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Native share sheet offered by the host, if any.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// `Ok(true)` once shared, `Ok(false)` when the user dismissed the sheet.
    async fn share(&self, data: &ShareData) -> Result<bool>;
}

/// Where a button sends the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "navigate", content = "href", rename_all = "snake_case")]
pub enum Navigation {
    /// One step back in history
    Back,
    /// Load another page
    To(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "share", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    Cancelled,
    /// `url` is what goes on the clipboard; the notice has come and gone
    Copied { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadingOutcome {
    Navigate(Navigation),
    Share(ShareOutcome),
}

/// Controls of an article reading page.
#[derive(Debug, Clone, Default)]
pub struct ReadingPage {
    back: Option<NodeId>,
    share: Option<NodeId>,
    about: Option<NodeId>,
    hero: Option<NodeId>,
}

impl ReadingPage {
    /// Returns `None` on pages without any reading control. Otherwise the
    /// notice animation is added to `<head>`.
    pub fn attach(page: &mut Document) -> Option<Self> {
        let reading = Self {
            back: page.element_by_id("backBtn"),
            share: page.element_by_id("shareBtn"),
            about: page.element_by_id("aboutBtn"),
            hero: page.query(HERO).ok().flatten(),
        };
        if reading.back.is_none()
            && reading.share.is_none()
            && reading.about.is_none()
            && reading.hero.is_none()
        {
            return None;
        }

        if let Ok(Some(head)) = page.query("head") {
            page.append_fragment(
                head,
                &Fragment::element("style", &[]).with_child(Fragment::text(NOTICE_KEYFRAMES)),
            );
        }
        Some(reading)
    }

    /// React to a click on one of the buttons. `None` when the event is not
    /// for this page's controls.
    pub async fn handle(
        &self,
        page: &mut Document,
        session: &PageSession,
        event: &PageEvent,
        sheet: Option<&dyn ShareSheet>,
        timer: &dyn Delay,
    ) -> Option<ReadingOutcome> {
        let PageEvent::Click { target } = event else {
            return None;
        };
        let hit = |button: Option<NodeId>| button.is_some_and(|b| page.contains(b, *target));

        if hit(self.back) {
            Some(ReadingOutcome::Navigate(Navigation::Back))
        } else if hit(self.about) {
            Some(ReadingOutcome::Navigate(Navigation::To(
                session.resolve(ABOUT_PAGE),
            )))
        } else if hit(self.share) {
            Some(ReadingOutcome::Share(
                self.share(page, session, sheet, timer).await,
            ))
        } else {
            None
        }
    }

    /// Share through the native sheet, falling back to copying the link
    /// when there is none or it fails.
    pub async fn share(
        &self,
        page: &mut Document,
        session: &PageSession,
        sheet: Option<&dyn ShareSheet>,
        timer: &dyn Delay,
    ) -> ShareOutcome {
        let data = share_data(page, session);
        if let Some(sheet) = sheet {
            match sheet.share(&data).await {
                Ok(true) => {
                    log::info!("Article shared successfully");
                    return ShareOutcome::Shared;
                }
                Ok(false) => return ShareOutcome::Cancelled,
                Err(error) => log::warn!("Share failed, copying link instead: {error}"),
            }
        }
        copy_link(page, data.url, timer).await
    }

    /// Move the hero image at half the scroll speed.
    pub fn parallax(&self, page: &mut Document, scroll_y: f64) {
        if let Some(hero) = self.hero {
            page.set_style(
                hero,
                "transform",
                &format!("translateY({}px)", scroll_y * PARALLAX_RATE),
            );
        }
    }
}

fn share_data(page: &Document, session: &PageSession) -> ShareData {
    let title = page
        .query("title")
        .ok()
        .flatten()
        .map(|t| page.text_content(t))
        .unwrap_or_default();
    let url = session
        .url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| session.path.clone());
    ShareData {
        title,
        text: SHARE_TEXT.to_string(),
        url,
    }
}

/// Show the copy notice for its lifetime, then take it down again.
async fn copy_link(page: &mut Document, url: String, timer: &dyn Delay) -> ShareOutcome {
    if let Some(notice) = show_copy_notice(page) {
        timer.sleep(NOTICE_LIFETIME).await;
        dismiss_notice(page, notice);
    }
    ShareOutcome::Copied { url }
}

fn show_copy_notice(page: &mut Document) -> Option<NodeId> {
    let body = page.body()?;
    let style = NOTICE_STYLE
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ");
    let notice = Fragment::element("div", &[("style", style.as_str())])
        .with_child(Fragment::text(COPY_NOTICE));
    Some(page.append_fragment(body, &notice))
}

fn dismiss_notice(page: &mut Document, notice: NodeId) {
    if page.body().is_some_and(|body| page.contains(body, notice)) {
        page.remove(notice);
    }
}
