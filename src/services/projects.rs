//! Projects page: title search and the project detail modal.

use crate::dom::{Document, ElementLookup, ElementQuery, NodeId, PageEvent};

const ITEMS: &str = ".project-item";

/// Search box, project items and detail modal of the projects page.
#[derive(Debug, Clone)]
pub struct ProjectsPage {
    search: Option<NodeId>,
    items: Vec<NodeId>,
    modal: Option<ProjectModal>,
}

#[derive(Debug, Clone, Copy)]
struct ProjectModal {
    modal: NodeId,
    title: NodeId,
    description: NodeId,
    close: Option<NodeId>,
}

impl ProjectsPage {
    /// Returns `None` on pages without project items.
    pub fn attach(page: &Document) -> Option<Self> {
        let items = page.query_all(ITEMS).unwrap_or_default();
        if items.is_empty() {
            return None;
        }

        let modal = match (
            page.element_by_id("projectModal"),
            page.element_by_id("modalTitle"),
            page.element_by_id("modalDescription"),
        ) {
            (Some(modal), Some(title), Some(description)) => Some(ProjectModal {
                modal,
                title,
                description,
                close: page.query(".close-modal").ok().flatten(),
            }),
            _ => None,
        };

        Some(Self {
            search: page.element_by_id("projectSearch"),
            items,
            modal,
        })
    }

    /// Show items whose `data-title` contains `query`, case-insensitively.
    /// Returns the number of visible items.
    pub fn filter(&self, page: &mut Document, query: &str) -> usize {
        let query = query.to_lowercase();
        let mut visible = 0;
        for &item in &self.items {
            let title = page.attr(item, "data-title").unwrap_or("").to_lowercase();
            let shown = title.contains(&query);
            page.set_style(item, "display", if shown { "block" } else { "none" });
            visible += usize::from(shown);
        }
        visible
    }

    /// Fill the modal from an item's data attributes and show it.
    pub fn open(&self, page: &mut Document, item: NodeId) -> bool {
        let Some(modal) = self.modal else {
            return false;
        };
        let title = page.attr(item, "data-title").unwrap_or("").to_string();
        let description = page.attr(item, "data-description").unwrap_or("").to_string();
        page.set_text(modal.title, &title);
        page.set_text(modal.description, &description);
        page.set_style(modal.modal, "display", "flex");
        true
    }

    pub fn close(&self, page: &mut Document) {
        if let Some(modal) = self.modal {
            page.set_style(modal.modal, "display", "none");
        }
    }

    pub fn handle(&self, page: &mut Document, event: &PageEvent) -> bool {
        match event {
            PageEvent::Input { target, value } if Some(*target) == self.search => {
                self.filter(page, value);
                true
            }
            PageEvent::Click { target } => {
                let target = *target;
                if let Some(item) = self.items.iter().find(|i| page.contains(**i, target)) {
                    return self.open(page, *item);
                }
                let Some(modal) = self.modal else {
                    return false;
                };
                let on_close = modal.close.is_some_and(|c| page.contains(c, target));
                if on_close || target == modal.modal {
                    self.close(page);
                    return true;
                }
                false
            }
            _ => false,
        }
    }
}
