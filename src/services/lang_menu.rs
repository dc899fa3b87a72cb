//! Language dropdown open/close state.

use crate::dom::{Document, ElementQuery, NodeId, PageEvent};

/// The `.lang-btn` / `.lang-switcher` / `.lang-menu` trio.
#[derive(Debug, Clone)]
pub struct LanguageDropdown {
    button: NodeId,
    switcher: NodeId,
    menu: NodeId,
}

impl LanguageDropdown {
    pub fn attach(page: &Document) -> Option<Self> {
        let find = |selector: &str| page.query(selector).ok().flatten();
        Some(Self {
            button: find(".lang-btn")?,
            switcher: find(".lang-switcher")?,
            menu: find(".lang-menu")?,
        })
    }

    pub fn is_open(&self, page: &Document) -> bool {
        page.attr(self.button, "aria-expanded") == Some("true")
    }

    fn set_open(&self, page: &mut Document, open: bool) {
        page.set_attr(self.button, "aria-expanded", if open { "true" } else { "false" });
        page.toggle_class(self.switcher, "active", open);
        page.set_attr(self.menu, "aria-hidden", if open { "false" } else { "true" });
    }

    /// Button clicks toggle; clicks outside the switcher and `Escape` close.
    pub fn handle(&self, page: &mut Document, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click { target } if page.contains(self.button, *target) => {
                let open = self.is_open(page);
                self.set_open(page, !open);
                true
            }
            PageEvent::Click { target } if !page.contains(self.switcher, *target) => {
                self.set_open(page, false);
                false
            }
            PageEvent::KeyDown { .. } if event.is_escape() => {
                self.set_open(page, false);
                false
            }
            _ => false,
        }
    }
}
