// src/services/previews.rs

//! Preview loader service.
//!
//! Fills placeholder containers with cards copied from sibling pages: the
//! article list and the events page. Every failure is contained here and
//! rendered as a fallback message; nothing propagates to the caller.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::dom::{Document, ElementLookup, Fragment, NodeId, SharedPage};
use crate::error::Result;
use crate::models::{Config, ContentKind, PageSession, PreviewOutcome, PreviewSpec};
use crate::services::Translator;
use crate::utils::html::parse_elements;
use crate::utils::http::{Delay, PageFetcher, RetryPolicy, fetch_html};

/// Service that fetches, selects and injects preview cards.
pub struct PreviewLoader {
    fetcher: Arc<dyn PageFetcher>,
    delay: Arc<dyn Delay>,
    translator: Arc<Translator>,
    policy: RetryPolicy,
    translation_delay: Duration,
    retry_button: bool,
}

impl PreviewLoader {
    /// Create a new loader with the given configuration.
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        delay: Arc<dyn Delay>,
        translator: Arc<Translator>,
    ) -> Self {
        Self {
            fetcher,
            delay,
            translator,
            policy: RetryPolicy::from_config(&config.fetch),
            translation_delay: Duration::from_millis(config.previews.translation_delay_ms),
            retry_button: config.previews.retry_button,
        }
    }

    /// Populate a single container.
    pub async fn populate(
        &self,
        page: &mut Document,
        session: &PageSession,
        spec: &PreviewSpec,
    ) -> PreviewOutcome {
        self.populate_all(page, session, std::slice::from_ref(spec))
            .await
            .into_iter()
            .next()
            .map(|(_, outcome)| outcome)
            .unwrap_or(PreviewOutcome::MissingTarget)
    }

    /// Populate several containers from one page-load event.
    pub async fn populate_all(
        &self,
        page: &mut Document,
        session: &PageSession,
        specs: &[PreviewSpec],
    ) -> Vec<(ContentKind, PreviewOutcome)> {
        self.populate_shared(&RefCell::new(page), session, specs)
            .await
    }

    /// Populate containers of a page that other behaviours update meanwhile.
    ///
    /// Containers are located first. Fetches for the ones present run
    /// together and each container is rendered as soon as its own fetch
    /// settles.
    pub async fn populate_shared(
        &self,
        page: &SharedPage<'_>,
        session: &PageSession,
        specs: &[PreviewSpec],
    ) -> Vec<(ContentKind, PreviewOutcome)> {
        let targets: Vec<(&PreviewSpec, Option<NodeId>)> = {
            let page = page.borrow();
            specs
                .iter()
                .map(|spec| (spec, find_container(&**page, spec)))
                .collect()
        };

        let loads = targets.into_iter().map(|(spec, container)| async move {
            let outcome = match container {
                Some(container) => {
                    let result = self.fetch_cards(spec, session).await;
                    self.render(&mut page.borrow_mut(), container, spec, session, result)
                }
                None => {
                    log::debug!("No #{} on this page, skipping", spec.container_id);
                    PreviewOutcome::MissingTarget
                }
            };
            (spec, outcome)
        });
        let settled = join_all(loads).await;

        let retranslate = settled.iter().any(|(spec, outcome)| {
            spec.retranslate && matches!(outcome, PreviewOutcome::Populated { .. })
        });
        if retranslate && !session.is_default_language() {
            self.delay.sleep(self.translation_delay).await;
            if let Err(error) = self.translator.reapply(&mut page.borrow_mut(), session) {
                log::warn!("Could not translate injected previews: {error}");
            }
        }

        settled
            .into_iter()
            .map(|(spec, outcome)| (spec.kind, outcome))
            .collect()
    }

    /// Fetch the source page, relative to the current page, and copy out
    /// its cards.
    pub async fn fetch_cards(
        &self,
        spec: &PreviewSpec,
        session: &PageSession,
    ) -> Result<Vec<Fragment>> {
        let source = session.resolve(&spec.source);
        let html = fetch_html(
            self.fetcher.as_ref(),
            self.delay.as_ref(),
            &source,
            self.policy,
        )
        .await?;
        Ok(parse_elements(&html, &spec.selector))
    }

    /// Write cards or a fallback into `container`.
    fn render(
        &self,
        page: &mut Document,
        container: NodeId,
        spec: &PreviewSpec,
        session: &PageSession,
        result: Result<Vec<Fragment>>,
    ) -> PreviewOutcome {
        let cards = match result {
            Ok(cards) => cards,
            Err(error) => {
                log::error!("Failed to load {}: {}", spec.kind, error);
                let fallback = if self.retry_button {
                    error_state_markup(&spec.fallback)
                } else {
                    fallback_markup(&spec.fallback)
                };
                replace_children(page, container, &fallback);
                return PreviewOutcome::FetchFailed {
                    error: error.to_string(),
                };
            }
        };

        if cards.is_empty() {
            log::info!("No {} found in {}", spec.kind, spec.source);
            replace_children(page, container, &fallback_markup(&spec.fallback));
            return PreviewOutcome::Empty;
        }

        page.clear_children(container);
        let shown = spec.effective_cap(session, cards.len());
        for card in &cards[..shown] {
            page.append_fragment(container, card);
        }
        log::info!("Loaded {} of {} {}", shown, cards.len(), spec.kind);

        PreviewOutcome::Populated {
            shown,
            available: cards.len(),
        }
    }
}

fn find_container(page: &impl ElementLookup, spec: &PreviewSpec) -> Option<NodeId> {
    page.element_by_id(&spec.container_id)
}

fn replace_children(page: &mut Document, container: NodeId, fragment: &Fragment) {
    page.clear_children(container);
    page.append_fragment(container, fragment);
}

/// Plain fallback paragraph.
pub fn fallback_markup(message: &str) -> Fragment {
    Fragment::element("p", &[]).with_child(Fragment::text(message))
}

/// Fallback block with a button that reloads the page.
pub fn error_state_markup(message: &str) -> Fragment {
    Fragment::element("div", &[("class", "error-state")])
        .with_child(Fragment::element("p", &[]).with_child(Fragment::text(message)))
        .with_child(
            Fragment::element("button", &[("onclick", "window.location.reload()")])
                .with_child(Fragment::text("Retry")),
        )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::dom::ElementQuery;
    use crate::models::{I18nConfig, PreviewConfig};
    use crate::utils::http::testing::{RecordingDelay, ScriptedFetcher};

    const HOME: &str = r#"<html><body>
        <section id="articles-preview"><p>Loading...</p></section>
        <section id="events-preview"></section>
    </body></html>"#;

    fn cards(n: usize) -> String {
        let cards: String = (1..=n)
            .map(|i| {
                format!(
                    r#"<div class="article-card" data-n="{i}"><h3 id="article{i}Title">Article {i}</h3></div>"#
                )
            })
            .collect();
        format!("<html><body><main>{cards}</main></body></html>")
    }

    fn events(n: usize) -> String {
        let items: String = (1..=n)
            .map(|i| format!(r#"<li class="event-item">Event {i}</li>"#))
            .collect();
        format!("<html><body><ul>{items}</ul></body></html>")
    }

    fn loader(config: &Config, fetcher: ScriptedFetcher) -> (PreviewLoader, Arc<RecordingDelay>) {
        let delay = Arc::new(RecordingDelay::default());
        let tables = BTreeMap::from([(
            "fr".to_string(),
            BTreeMap::from([("article1Title".to_string(), "Article un".to_string())]),
        )]);
        let loader = PreviewLoader::new(
            config,
            Arc::new(fetcher),
            delay.clone(),
            Arc::new(Translator::new(tables, I18nConfig::default())),
        );
        (loader, delay)
    }

    fn spec(kind: ContentKind) -> PreviewSpec {
        PreviewSpec::for_kind(kind, &PreviewConfig::default())
    }

    fn card_numbers(page: &Document) -> Vec<String> {
        let container = page.element_by_id("articles-preview").unwrap();
        page.element_children(container)
            .into_iter()
            .map(|c| page.attr(c, "data-n").unwrap_or("").to_string())
            .collect()
    }

    #[tokio::test]
    async fn home_page_shows_first_three_of_five() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new().respond("articles-list.html", 200, &cards(5));
        let (loader, delay) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/index.html", "en");

        let outcome = loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        assert_eq!(
            outcome,
            PreviewOutcome::Populated {
                shown: 3,
                available: 5
            }
        );
        assert_eq!(card_numbers(&page), ["1", "2", "3"]);
        assert!(delay.slept().is_empty());
    }

    #[tokio::test]
    async fn listing_page_shows_every_article() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new().respond("articles-list.html", 200, &cards(5));
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/articles.html", "en");

        let outcome = loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        assert_eq!(outcome.shown(), 5);
        assert_eq!(card_numbers(&page), ["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn empty_source_renders_fallback() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new().respond("articles-list.html", 200, &cards(0));
        let (loader, delay) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");

        let outcome = loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        assert_eq!(outcome, PreviewOutcome::Empty);
        let container = page.element_by_id("articles-preview").unwrap();
        assert_eq!(
            page.inner_html(container),
            "<p>No articles available yet.</p>"
        );
        assert!(delay.slept().is_empty());
    }

    #[tokio::test]
    async fn exhausted_fetch_renders_fallback() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new()
            .respond("events.html", 500, "")
            .respond("events.html", 502, "");
        let (loader, delay) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");

        let outcome = loader
            .populate(&mut page, &session, &spec(ContentKind::Events))
            .await;
        assert!(matches!(outcome, PreviewOutcome::FetchFailed { .. }));
        let container = page.element_by_id("events-preview").unwrap();
        assert_eq!(page.inner_html(container), "<p>No upcoming events yet.</p>");
        assert_eq!(delay.slept(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn retry_button_variant_renders_error_state() {
        let mut config = Config::default();
        config.previews.retry_button = true;
        let fetcher = ScriptedFetcher::new().fail("events.html", "offline");
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");

        loader
            .populate(&mut page, &session, &spec(ContentKind::Events))
            .await;
        let states = page.query_all("#events-preview .error-state button").unwrap();
        assert_eq!(states.len(), 1);
    }

    #[tokio::test]
    async fn missing_container_is_a_silent_no_op() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new();
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse("<html><body><p>about</p></body></html>");
        let before = page.to_html();
        let session = PageSession::new("/about.html", "en");

        let outcome = loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        assert_eq!(outcome, PreviewOutcome::MissingTarget);
        assert_eq!(page.to_html(), before);
    }

    #[tokio::test]
    async fn missing_container_never_fetches() {
        let config = Config::default();
        let fetcher = Arc::new(ScriptedFetcher::new());
        let loader = PreviewLoader::new(
            &config,
            fetcher.clone(),
            Arc::new(RecordingDelay::default()),
            Arc::new(Translator::default()),
        );
        let mut page = Document::parse("<html><body></body></html>");
        let session = PageSession::new("/", "en");

        loader
            .populate(&mut page, &session, &spec(ContentKind::Events))
            .await;
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn repopulating_replaces_previous_cards() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new()
            .respond("articles-list.html", 200, &cards(5))
            .respond("articles-list.html", 200, &cards(5));
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");
        let articles = spec(ContentKind::Articles);

        loader.populate(&mut page, &session, &articles).await;
        loader.populate(&mut page, &session, &articles).await;
        assert_eq!(card_numbers(&page), ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn fallback_then_success_leaves_only_cards() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new()
            .respond("articles-list.html", 200, &cards(0))
            .respond("articles-list.html", 200, &cards(2));
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");
        let articles = spec(ContentKind::Articles);

        loader.populate(&mut page, &session, &articles).await;
        loader.populate(&mut page, &session, &articles).await;
        let container = page.element_by_id("articles-preview").unwrap();
        assert_eq!(page.element_children(container).len(), 2);
        assert!(page.query_all("#articles-preview p").unwrap().is_empty());
    }

    #[tokio::test]
    async fn both_kinds_load_from_one_event() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new()
            .respond("articles-list.html", 200, &cards(4))
            .respond("events.html", 200, &events(6));
        let (loader, _) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");
        let specs = [spec(ContentKind::Articles), spec(ContentKind::Events)];

        let outcomes = loader.populate_all(&mut page, &session, &specs).await;
        assert_eq!(outcomes[0].1.shown(), 3);
        assert_eq!(outcomes[1].1.shown(), 3);
        assert_eq!(page.query_all("#events-preview .event-item").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn non_default_language_retranslates_injected_cards() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new().respond("articles-list.html", 200, &cards(3));
        let (loader, delay) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let mut session = PageSession::new("/", "en");
        session.language = "fr".to_string();

        loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        let title = page.element_by_id("article1Title").unwrap();
        assert_eq!(page.text_content(title), "Article un");
        assert_eq!(delay.slept(), vec![Duration::from_millis(100)]);
    }

    #[tokio::test]
    async fn default_language_skips_retranslation() {
        let config = Config::default();
        let fetcher = ScriptedFetcher::new().respond("articles-list.html", 200, &cards(3));
        let (loader, delay) = loader(&config, fetcher);
        let mut page = Document::parse(HOME);
        let session = PageSession::new("/", "en");

        loader
            .populate(&mut page, &session, &spec(ContentKind::Articles))
            .await;
        let title = page.element_by_id("article1Title").unwrap();
        assert_eq!(page.text_content(title), "Article 1");
        assert!(delay.slept().is_empty());
    }
}
