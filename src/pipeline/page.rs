// src/pipeline/page.rs

//! A parsed page with its behaviours attached.
//!
//! `SitePage` drives the two lifecycle events of a page view and routes user
//! events to whichever components the page carries.

use std::cell::RefCell;
use std::sync::Arc;

use serde::Serialize;

use crate::dom::{Document, ElementQuery, NodeId, PageEvent};
use crate::error::Result;
use crate::models::{Config, ContentKind, PageSession, PreviewOutcome, PreviewSpec};
use crate::services::{
    ArticleModal, IntroAnimation, IntroOutcome, LanguageDropdown, NavigationMenu, PreviewLoader,
    ProjectsPage, ReadingOutcome, ReadingPage, ShareSheet, Translator, TypewriterEffect, Viewport,
    activate_current_page, navbar,
};
use crate::utils::http::{Delay, PageFetcher};

/// Inline handlers that open the article modal.
const ARTICLE_TOGGLES: &str = "[onclick]";

/// Shared collaborators for every page view.
#[derive(Clone)]
pub struct PageContext {
    pub config: Arc<Config>,
    pub translator: Arc<Translator>,
    pub fetcher: Arc<dyn PageFetcher>,
    /// Retry and translation pauses
    pub delay: Arc<dyn Delay>,
    /// Intro animation timers
    pub animation: Arc<dyn Delay>,
    /// Native share support; without it sharing copies the link
    pub share_sheet: Option<Arc<dyn ShareSheet>>,
}

impl PageContext {
    pub fn new(config: Config, fetcher: Arc<dyn PageFetcher>, delay: Arc<dyn Delay>) -> Self {
        Self {
            translator: Arc::new(Translator::from_config(&config)),
            config: Arc::new(config),
            fetcher,
            animation: Arc::clone(&delay),
            delay,
            share_sheet: None,
        }
    }

    /// Use a separate timer for the intro animation.
    pub fn with_animation(mut self, animation: Arc<dyn Delay>) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_share_sheet(mut self, sheet: Arc<dyn ShareSheet>) -> Self {
        self.share_sheet = Some(sheet);
        self
    }

    pub fn preview_loader(&self) -> PreviewLoader {
        PreviewLoader::new(
            &self.config,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.delay),
            Arc::clone(&self.translator),
        )
    }

    /// Preview specs for every content kind.
    pub fn preview_specs(&self) -> Vec<PreviewSpec> {
        ContentKind::ALL
            .iter()
            .map(|kind| PreviewSpec::for_kind(*kind, &self.config.previews))
            .collect()
    }
}

/// What the page-load event did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub intro_completed: bool,
    pub typewriter_attached: bool,
    pub previews: Vec<(ContentKind, PreviewOutcome)>,
}

/// One page view.
pub struct SitePage {
    document: Document,
    session: PageSession,
    menu: Option<NavigationMenu>,
    dropdown: Option<LanguageDropdown>,
    article_modal: Option<ArticleModal>,
    projects: Option<ProjectsPage>,
    reading: Option<ReadingPage>,
    typewriter: Option<TypewriterEffect>,
}

impl SitePage {
    pub fn new(document: Document, session: PageSession) -> Self {
        Self {
            document,
            session,
            menu: None,
            dropdown: None,
            article_modal: None,
            projects: None,
            reading: None,
            typewriter: None,
        }
    }

    pub fn parse(html: &str, session: PageSession) -> Self {
        Self::new(Document::parse(html), session)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Markup-ready setup: navbar, menus, modals and project search.
    pub fn dom_content_loaded(&mut self, seed: u64) {
        log::info!("Initializing page {}", self.session.path);
        navbar::decorate(&mut self.document, &self.session, seed);
        navbar::update_nav_text(&mut self.document, &self.session);

        self.menu = NavigationMenu::attach(&self.document);
        if self.menu.is_some() {
            activate_current_page(&mut self.document, &self.session);
        }
        self.dropdown = LanguageDropdown::attach(&self.document);
        self.article_modal = ArticleModal::attach(&self.document);
        self.projects = ProjectsPage::attach(&self.document);
        self.reading = ReadingPage::attach(&mut self.document);
    }

    /// Full-load work: typewriter reset, then the intro fade and preview
    /// loading side by side.
    pub async fn load(&mut self, ctx: &PageContext) -> LoadReport {
        self.typewriter = TypewriterEffect::attach(&mut self.document, &ctx.config.typewriter);

        let animation = IntroAnimation::new(&ctx.config.intro);
        let loader = ctx.preview_loader();
        let specs = ctx.preview_specs();
        let page = RefCell::new(&mut self.document);
        let (intro, previews) = futures::join!(
            animation.run_shared(&page, ctx.animation.as_ref()),
            loader.populate_shared(&page, &self.session, &specs),
        );

        LoadReport {
            intro_completed: intro == IntroOutcome::Completed,
            typewriter_attached: self.typewriter.is_some(),
            previews,
        }
    }

    /// Switch language for the whole page.
    pub fn set_language(&mut self, ctx: &PageContext, lang: &str) -> Result<usize> {
        ctx.translator
            .set_language(&mut self.document, &mut self.session, lang)
    }

    /// Route an event to every interested component. Returns true when one
    /// of them consumed it.
    pub fn dispatch(&mut self, ctx: &PageContext, event: &PageEvent) -> bool {
        let page = &mut self.document;
        let mut handled = false;

        if let Some(menu) = &self.menu {
            handled |= menu.handle(page, event);
        }
        if let Some(dropdown) = &self.dropdown {
            handled |= dropdown.handle(page, event);
        }

        if let PageEvent::Click { target } = event {
            match ctx.translator.handle_click(page, &mut self.session, *target) {
                Some(Ok(_)) => handled = true,
                Some(Err(e)) => log::error!("Language switch failed: {e}"),
                None => {}
            }
            if let (Some(modal), Some(toggle)) = (&self.article_modal, article_toggle(page, *target))
            {
                handled |= modal.open_from(page, toggle);
            }
        }

        if let Some(modal) = &self.article_modal {
            handled |= modal.handle(page, event);
        }
        if let Some(projects) = &self.projects {
            handled |= projects.handle(page, event);
        }
        handled
    }

    /// Reading-page buttons. Navigation requests are returned for the host
    /// to carry out; sharing runs to completion, copy notice included.
    pub async fn activate(
        &mut self,
        ctx: &PageContext,
        event: &PageEvent,
    ) -> Option<ReadingOutcome> {
        let reading = self.reading.as_ref()?;
        reading
            .handle(
                &mut self.document,
                &self.session,
                event,
                ctx.share_sheet.as_deref(),
                ctx.delay.as_ref(),
            )
            .await
    }

    /// Advance scroll effects by one animation frame.
    pub fn scroll(&mut self, viewport: Viewport) {
        if let Some(typewriter) = &mut self.typewriter {
            typewriter.frame(&mut self.document, viewport);
        }
        if let Some(reading) = &self.reading {
            reading.parallax(&mut self.document, viewport.scroll_y);
        }
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }
}

fn article_toggle(page: &Document, target: NodeId) -> Option<NodeId> {
    page.query_all(ARTICLE_TOGGLES)
        .ok()?
        .into_iter()
        .filter(|toggle| {
            page.attr(*toggle, "onclick")
                .is_some_and(|handler| handler.contains("toggleArticle"))
        })
        .find(|toggle| page.contains(*toggle, target))
}
