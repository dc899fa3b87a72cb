// src/pipeline/render.rs

use url::Url;

use crate::dom::Document;
use crate::error::{AppError, Result};
use crate::models::{Config, ContentKind, PageSession, PreviewOutcome, PreviewSpec};
use crate::pipeline::{PageContext, SitePage};
use crate::utils::http::{RetryPolicy, fetch_html};

/// Site root from `fetch.base_url`.
pub fn base_url(config: &Config) -> Result<Url> {
    let base = config
        .fetch
        .base_url
        .as_deref()
        .ok_or_else(|| AppError::config("fetch.base_url is not set"))?;
    Ok(Url::parse(base)?)
}

/// Fetch a page, run both lifecycle events on it and return the final HTML.
///
/// `lang` is applied between the two events so injected previews are
/// translated too.
pub async fn run_render(
    ctx: &PageContext,
    page_url: &Url,
    lang: Option<&str>,
    seed: u64,
) -> Result<String> {
    log::info!("Rendering {page_url}");
    let html = fetch_html(
        ctx.fetcher.as_ref(),
        ctx.delay.as_ref(),
        page_url.as_str(),
        RetryPolicy::from_config(&ctx.config.fetch),
    )
    .await?;

    let session = PageSession::for_url(page_url, &ctx.config.i18n.default_language);
    let mut site = SitePage::parse(&html, session);
    site.dom_content_loaded(seed);
    if let Some(lang) = lang {
        site.set_language(ctx, lang)?;
    }

    let report = site.load(ctx).await;
    for (kind, outcome) in &report.previews {
        log::info!("{kind} previews: {outcome:?}");
    }
    Ok(site.to_html())
}

/// Populate one preview kind into a blank container, with sources resolved
/// against `page_url`.
pub async fn run_preview(ctx: &PageContext, kind: ContentKind, page_url: &Url) -> PreviewOutcome {
    let mut page = Document::parse(&format!(
        r#"<html><body><div id="{}"></div></body></html>"#,
        kind.container_id()
    ));
    let session = PageSession::for_url(page_url, &ctx.config.i18n.default_language);
    let spec = PreviewSpec::for_kind(kind, &ctx.config.previews);
    ctx.preview_loader().populate(&mut page, &session, &spec).await
}

/// Validate configuration values and report what was loaded.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {e}");
        return Err(e);
    }

    log::info!("  User agent: {}", config.fetch.user_agent);
    log::info!(
        "  Fetch: {} attempts, {} ms apart",
        config.fetch.retries,
        config.fetch.retry_delay_ms
    );
    log::info!(
        "  Previews: {} articles, {} events",
        config.previews.articles_to_show,
        config.previews.events_to_show
    );

    let selectable: Vec<_> = config.i18n.labels.values().collect();
    for lang in config.translations.keys() {
        if !selectable.contains(&lang) {
            log::warn!("Translation table {lang} has no language option");
        }
    }
    for lang in &selectable {
        if !config.translations.contains_key(lang.as_str()) {
            return Err(AppError::validation(format!(
                "language option {lang} has no translation table"
            )));
        }
    }
    log::info!("  Languages: {}", config.translations.len());
    log::info!("All validations passed!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::utils::http::NoDelay;
    use crate::utils::http::testing::{RecordingDelay, ScriptedFetcher};

    const EVENTS: &str = r#"<html><body>
        <div class="event-item">A</div><div class="event-item">B</div>
        <div class="event-item">C</div><div class="event-item">D</div>
    </body></html>"#;

    fn config() -> Config {
        let mut config = Config::default();
        config.fetch.base_url = Some("https://userism.net/".to_string());
        for code in config.i18n.labels.values() {
            config.translations.insert(
                code.clone(),
                BTreeMap::from([("hero-title".to_string(), format!("title-{code}"))]),
            );
        }
        config
    }

    #[test]
    fn base_url_is_required() {
        assert!(matches!(
            base_url(&Config::default()),
            Err(AppError::Config(_))
        ));
        assert_eq!(base_url(&config()).unwrap().as_str(), "https://userism.net/");
    }

    #[tokio::test]
    async fn renders_with_language_and_previews() {
        let fetcher = ScriptedFetcher::new()
            .respond(
                "https://userism.net/about.html",
                200,
                r#"<html><body><h1 id="hero-title">About</h1><div id="events-preview"></div></body></html>"#,
            )
            .respond("https://userism.net/events.html", 200, EVENTS);
        let delay = Arc::new(RecordingDelay::default());
        let ctx = PageContext::new(config(), Arc::new(fetcher), delay.clone())
            .with_animation(Arc::new(NoDelay));
        let url = Url::parse("https://userism.net/about.html").unwrap();

        let html = run_render(&ctx, &url, Some("fr"), 0).await.unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("title-fr"));
        assert_eq!(html.matches("event-item").count(), 3);
        assert!(html.contains("--nav-bg-color: #FFFF00"));
        assert!(delay.slept().is_empty());
    }

    #[tokio::test]
    async fn render_fails_when_page_is_unreachable() {
        let ctx = PageContext::new(
            config(),
            Arc::new(ScriptedFetcher::new()),
            Arc::new(RecordingDelay::default()),
        );
        let url = Url::parse("https://userism.net/missing.html").unwrap();
        assert!(matches!(
            run_render(&ctx, &url, None, 0).await,
            Err(AppError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn preview_reports_outcome() {
        let fetcher =
            ScriptedFetcher::new().respond("https://userism.net/events.html", 200, EVENTS);
        let ctx = PageContext::new(config(), Arc::new(fetcher), Arc::new(NoDelay));
        let url = Url::parse("https://userism.net/events.html").unwrap();

        let outcome = run_preview(&ctx, ContentKind::Events, &url).await;
        assert_eq!(
            outcome,
            PreviewOutcome::Populated {
                shown: 3,
                available: 4
            }
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "populated");
    }

    #[tokio::test]
    async fn nested_page_fetches_sources_beside_itself() {
        let fetcher = Arc::new(ScriptedFetcher::new().respond(
            "https://userism.net/articles/articles-list.html",
            200,
            r#"<html><body><div class="article-card">x</div></body></html>"#,
        ));
        let ctx = PageContext::new(config(), fetcher.clone(), Arc::new(NoDelay));
        let url = Url::parse("https://userism.net/articles/x.html").unwrap();

        let outcome = run_preview(&ctx, ContentKind::Articles, &url).await;
        assert_eq!(outcome.shown(), 1);
        assert_eq!(
            fetcher.calls(),
            ["https://userism.net/articles/articles-list.html"]
        );
    }

    #[test]
    fn validate_requires_tables_for_options() {
        assert!(run_validate(&config()).is_ok());

        let mut missing = config();
        missing.translations.remove("zh");
        assert!(matches!(
            run_validate(&missing),
            Err(AppError::Validation(_))
        ));
    }
}
