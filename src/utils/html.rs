// src/utils/html.rs

//! Parsing fetched pages and pulling fragments out of them.

use scraper::{Html, Selector};

use crate::dom::Fragment;
use crate::error::{AppError, Result};

/// Parse a CSS selector for use against fetched pages.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Parse `html` as a detached document and copy out every element matching
/// `selector`, in document order.
///
/// The HTML parser is permissive; a selector that cannot be parsed is logged
/// and yields no elements.
pub fn parse_elements(html: &str, selector: &str) -> Vec<Fragment> {
    let selector = match parse_selector(selector) {
        Ok(selector) => selector,
        Err(error) => {
            log::error!("Error parsing HTML: {error}");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(Fragment::from_element)
        .collect()
}
