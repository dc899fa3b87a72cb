//! Per-page navbar colour and title.

use crate::dom::{Document, ElementQuery};
use crate::models::PageSession;

const CYAN: &str = "#00FFFF";
const YELLOW: &str = "#FFFF00";
const MAGENTA: &str = "#FF00FF";

/// Colours the home page picks from.
pub const HOME_PALETTE: [&str; 3] = [YELLOW, CYAN, MAGENTA];

/// Navbar colour for a named page. The home page has no fixed colour.
pub fn page_color(page_name: &str) -> Option<&'static str> {
    match page_name {
        "index" => None,
        "articles" => Some(CYAN),
        "events" | "about" => Some(YELLOW),
        "projects" => Some(MAGENTA),
        _ => Some(CYAN),
    }
}

/// Set `--nav-bg-color` and `--page-bg-color` on the document element.
///
/// `seed` selects the home page colour from [`HOME_PALETTE`].
pub fn decorate(page: &mut Document, session: &PageSession, seed: u64) -> &'static str {
    let name = session.page_name();
    let color = match page_color(name) {
        Some(color) => {
            log::debug!("Page navbar: {} -> {}", name, color);
            color
        }
        None => {
            let color = HOME_PALETTE[(seed % HOME_PALETTE.len() as u64) as usize];
            log::debug!("Random homepage navbar: {}", color);
            color
        }
    };

    if let Some(html) = page.document_element() {
        page.set_style(html, "--nav-bg-color", color);
        page.set_style(html, "--page-bg-color", color);
    }
    color
}

fn display_name(page_name: &str) -> &'static str {
    match page_name {
        "index" => "HOME",
        "articles" => "ARTICLES",
        "events" => "EVENTS",
        "projects" => "PROJECTS",
        "about" => "ABOUT",
        _ => "",
    }
}

/// Title the `.nav-logo-text` with the current page. The home page keeps
/// its authored title.
pub fn update_nav_text(page: &mut Document, session: &PageSession) -> bool {
    let name = session.page_name();
    if name == "index" {
        return false;
    }
    let Some(text) = page.query(".nav-logo-text").ok().flatten() else {
        return false;
    };
    page.set_text(text, &format!("USERISM COLLECTIVE — {}", display_name(name)));
    true
}
