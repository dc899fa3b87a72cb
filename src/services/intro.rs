//! Intro overlay fade-out.

use std::cell::RefCell;
use std::time::Duration;

use crate::dom::{Document, ElementLookup, SharedPage};
use crate::models::IntroConfig;
use crate::utils::http::Delay;

/// How the intro sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    /// No `#intro` element; the body was revealed immediately
    Skipped,
    /// The overlay faded out and was hidden
    Completed,
}

/// Fades `#intro` out after a short pause, then reveals the page.
#[derive(Debug, Clone, Copy)]
pub struct IntroAnimation {
    delay: Duration,
    fade: Duration,
}

impl IntroAnimation {
    pub fn new(config: &IntroConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            fade: Duration::from_millis(config.fade_ms),
        }
    }

    pub async fn run(&self, page: &mut Document, timer: &dyn Delay) -> IntroOutcome {
        self.run_shared(&RefCell::new(page), timer).await
    }

    /// Run against a page that other behaviours update while the timers
    /// are pending.
    pub async fn run_shared(&self, page: &SharedPage<'_>, timer: &dyn Delay) -> IntroOutcome {
        let found = page.borrow().element_by_id("intro");
        let Some(intro) = found else {
            log::warn!("No intro element found - skipping animation");
            reveal(&mut page.borrow_mut());
            return IntroOutcome::Skipped;
        };

        log::debug!("Starting intro animation...");
        timer.sleep(self.delay).await;
        {
            let mut page = page.borrow_mut();
            page.set_style(intro, "opacity", "0");
            page.set_style(
                intro,
                "transition",
                &format!("opacity {}ms ease", self.fade.as_millis()),
            );
        }

        timer.sleep(self.fade).await;
        {
            let mut page = page.borrow_mut();
            page.set_style(intro, "display", "none");
            page.set_style(intro, "visibility", "hidden");
            reveal(&mut page);
        }
        log::debug!("Intro animation complete");
        IntroOutcome::Completed
    }
}

fn reveal(page: &mut Document) {
    if let Some(body) = page.body() {
        page.add_class(body, "loaded");
        page.set_style(body, "overflow", "");
    }
}
