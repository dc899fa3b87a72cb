//! Hamburger navigation overlay.

use crate::dom::{Document, ElementLookup, ElementQuery, NodeId, PageEvent};
use crate::models::PageSession;

const NAV_LINKS: &str = ".menu-link, .overlay-nav a";

/// The overlay menu and the controls that drive it.
#[derive(Debug, Clone)]
pub struct NavigationMenu {
    hamburger: NodeId,
    overlay: NodeId,
    close_button: Option<NodeId>,
    links: Vec<NodeId>,
}

impl NavigationMenu {
    /// Locate the menu elements. Returns `None` when the page has no menu.
    pub fn attach(page: &Document) -> Option<Self> {
        let (Some(hamburger), Some(overlay)) = (
            page.element_by_id("hamburger"),
            page.element_by_id("menuOverlay"),
        ) else {
            log::error!("Hamburger or overlay not found!");
            return None;
        };

        log::debug!("Found hamburger and overlay elements");
        Some(Self {
            hamburger,
            overlay,
            close_button: page.element_by_id("closeMenu"),
            links: page.query_all(NAV_LINKS).unwrap_or_default(),
        })
    }

    pub fn is_open(&self, page: &Document) -> bool {
        page.has_class(self.overlay, "active")
    }

    pub fn open(&self, page: &mut Document) {
        log::debug!("Opening menu");
        page.add_class(self.overlay, "active");
        page.add_class(self.hamburger, "active");
        page.set_attr(self.hamburger, "aria-expanded", "true");
        if let Some(body) = page.body() {
            page.set_style(body, "overflow", "hidden");
        }
    }

    pub fn close(&self, page: &mut Document) {
        log::debug!("Closing menu");
        page.remove_class(self.overlay, "active");
        page.remove_class(self.hamburger, "active");
        page.set_attr(self.hamburger, "aria-expanded", "false");
        if let Some(body) = page.body() {
            page.set_style(body, "overflow", "");
        }
    }

    pub fn toggle(&self, page: &mut Document) {
        if self.is_open(page) {
            self.close(page);
        } else {
            self.open(page);
        }
    }

    /// React to an event. Returns true when the event was consumed.
    pub fn handle(&self, page: &mut Document, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click { target } => {
                let target = *target;
                if page.contains(self.hamburger, target) {
                    self.toggle(page);
                    true
                } else if self
                    .close_button
                    .is_some_and(|button| page.contains(button, target))
                {
                    self.close(page);
                    true
                } else if self.links.iter().any(|link| page.contains(*link, target)) {
                    // Navigation still proceeds; only the overlay closes.
                    self.close(page);
                    false
                } else if target == self.overlay {
                    self.close(page);
                    true
                } else {
                    false
                }
            }
            PageEvent::KeyDown { .. } if event.is_escape() && self.is_open(page) => {
                self.close(page);
                true
            }
            _ => false,
        }
    }
}

/// Mark navigation links that point at the current page.
pub fn activate_current_page(page: &mut Document, session: &PageSession) -> usize {
    let current = session.page_name().to_string();
    let links = page.query_all(NAV_LINKS).unwrap_or_default();

    let mut activated = 0;
    for link in links {
        let matches = page.attr(link, "href").is_some_and(|href| {
            href.contains(&current) || (current == "index" && href.contains("index.html"))
        });
        if matches {
            page.add_class(link, "active");
            activated += 1;
        }
    }
    activated
}
