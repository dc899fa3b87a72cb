//! Article reader modal.

use crate::dom::{Document, ElementLookup, NodeId, PageEvent};

/// `#articleModal` with its `#modalContent` slot.
#[derive(Debug, Clone, Copy)]
pub struct ArticleModal {
    modal: NodeId,
    content: NodeId,
}

impl ArticleModal {
    pub fn attach(page: &Document) -> Option<Self> {
        Some(Self {
            modal: page.element_by_id("articleModal")?,
            content: page.element_by_id("modalContent")?,
        })
    }

    pub fn is_active(&self, page: &Document) -> bool {
        page.has_class(self.modal, "active")
    }

    /// Show the body that follows `toggle` (its next element sibling).
    pub fn open_from(&self, page: &mut Document, toggle: NodeId) -> bool {
        let Some(source) = page.next_element_sibling(toggle) else {
            log::error!("Modal elements not found");
            return false;
        };

        let copies: Vec<_> = page
            .children(source)
            .iter()
            .map(|child| page.fragment(*child))
            .collect();
        page.clear_children(self.content);
        for copy in &copies {
            page.append_fragment(self.content, copy);
        }

        page.add_class(self.modal, "active");
        if let Some(body) = page.body() {
            page.set_style(body, "overflow", "hidden");
        }
        true
    }

    pub fn close(&self, page: &mut Document) {
        page.remove_class(self.modal, "active");
        if let Some(body) = page.body() {
            page.set_style(body, "overflow", "");
        }
    }

    /// Backdrop clicks and `Escape` close an active modal.
    pub fn handle(&self, page: &mut Document, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click { target } if *target == self.modal => {
                self.close(page);
                true
            }
            PageEvent::KeyDown { .. } if event.is_escape() && self.is_active(page) => {
                self.close(page);
                true
            }
            _ => false,
        }
    }
}
