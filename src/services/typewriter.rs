//! Scroll-driven typewriter reveal.
//!
//! Typing starts once the bottom of the landing section passes the middle of
//! the viewport. From then on the number of visible characters chases
//! `scroll distance / pixels_per_char`, closing a fixed fraction of the gap on
//! every animation frame.

use unicode_segmentation::UnicodeSegmentation;

use crate::dom::{Document, ElementLookup, NodeId};
use crate::models::TypewriterConfig;

/// Scroll geometry sampled once per animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// `window.scrollY`
    pub scroll_y: f64,
    /// `window.innerHeight`
    pub inner_height: f64,
    /// Bottom edge of the landing section relative to the viewport top
    pub landing_bottom: f64,
}

/// Pure reveal state, independent of the page tree.
#[derive(Debug, Clone)]
pub struct Typewriter {
    message: String,
    boundaries: Vec<usize>,
    pixels_per_char: f64,
    smoothing: f64,
    char_index: f64,
    start_scroll: Option<f64>,
}

impl Typewriter {
    pub fn new(config: &TypewriterConfig) -> Self {
        let boundaries = config
            .message
            .grapheme_indices(true)
            .map(|(i, _)| i)
            .skip(1)
            .chain(std::iter::once(config.message.len()))
            .collect();
        Self {
            message: config.message.clone(),
            boundaries,
            pixels_per_char: config.pixels_per_char,
            smoothing: config.smoothing,
            char_index: 0.0,
            start_scroll: None,
        }
    }

    /// Number of user-perceived characters in the message.
    pub fn len(&self) -> usize {
        if self.message.is_empty() {
            0
        } else {
            self.boundaries.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_started(&self) -> bool {
        self.start_scroll.is_some()
    }

    /// Advance one frame. Returns the text to display once typing started.
    pub fn frame(&mut self, viewport: Viewport) -> Option<&str> {
        if self.start_scroll.is_none() && viewport.landing_bottom <= viewport.inner_height / 2.0 {
            self.start_scroll = Some(viewport.scroll_y);
        }
        let start = self.start_scroll?;

        let distance = viewport.scroll_y - start;
        let target = (distance / self.pixels_per_char).floor();
        self.char_index += (target - self.char_index) * self.smoothing;

        let shown = self.char_index.floor().clamp(0.0, self.len() as f64) as usize;
        Some(self.prefix(shown))
    }

    fn prefix(&self, graphemes: usize) -> &str {
        match graphemes {
            0 => "",
            n => &self.message[..self.boundaries[n - 1]],
        }
    }
}

/// A [`Typewriter`] bound to `#typewriter-text`.
#[derive(Debug, Clone)]
pub struct TypewriterEffect {
    output: NodeId,
    typewriter: Typewriter,
}

impl TypewriterEffect {
    /// Bind to the page; all three anchor elements must exist.
    pub fn attach(page: &mut Document, config: &TypewriterConfig) -> Option<Self> {
        let output = page.element_by_id("typewriter-text")?;
        page.element_by_id("typewriter-section")?;
        page.element_by_id("landing")?;

        page.set_text(output, "");
        Some(Self {
            output,
            typewriter: Typewriter::new(config),
        })
    }

    pub fn frame(&mut self, page: &mut Document, viewport: Viewport) {
        if let Some(text) = self.typewriter.frame(viewport) {
            page.set_text(self.output, text);
        }
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(message: &str) -> TypewriterConfig {
        TypewriterConfig {
            message: message.to_string(),
            ..TypewriterConfig::default()
        }
    }

    fn at(scroll_y: f64, landing_bottom: f64) -> Viewport {
        Viewport {
            scroll_y,
            inner_height: 800.0,
            landing_bottom,
        }
    }

    #[test]
    fn waits_for_landing_to_pass_centre() {
        let mut tw = Typewriter::new(&config("hello"));
        assert_eq!(tw.frame(at(0.0, 900.0)), None);
        assert_eq!(tw.frame(at(100.0, 401.0)), None);
        assert!(!tw.is_started());
        assert_eq!(tw.frame(at(200.0, 400.0)), Some(""));
        assert!(tw.is_started());
    }

    #[test]
    fn eases_toward_scroll_target() {
        let mut tw = Typewriter::new(&config("abcdefghijklmnopqrstuvwxyz"));
        tw.frame(at(0.0, 0.0));

        // 40px -> target 10; first frame covers 15% of the gap.
        assert_eq!(tw.frame(at(40.0, -40.0)), Some("a"));
        let mut last = String::new();
        for _ in 0..100 {
            last = tw.frame(at(40.0, -40.0)).unwrap().to_string();
        }
        assert_eq!(last, "abcdefghi");
    }

    #[test]
    fn clamps_to_message_bounds() {
        let mut tw = Typewriter::new(&config("hi"));
        tw.frame(at(1000.0, 0.0));
        for _ in 0..200 {
            tw.frame(at(10_000.0, -9_000.0));
        }
        assert_eq!(tw.frame(at(10_000.0, -9_000.0)), Some("hi"));

        for _ in 0..200 {
            tw.frame(at(0.0, 0.0));
        }
        assert_eq!(tw.frame(at(0.0, 0.0)), Some(""));
    }

    #[test]
    fn counts_graphemes_not_bytes() {
        let tw = Typewriter::new(&config("né 文字"));
        assert_eq!(tw.len(), 5);
        assert_eq!(tw.prefix(2), "né");
        assert_eq!(tw.prefix(5), "né 文字");
        assert!(Typewriter::new(&config("")).is_empty());
    }

    #[test]
    fn effect_requires_all_anchors() {
        let mut page = Document::parse(
            r#"<html><body><section id="landing"></section>
            <section id="typewriter-section"><p id="typewriter-text">static</p></section>
            </body></html>"#,
        );
        let mut effect = TypewriterEffect::attach(&mut page, &config("abc")).unwrap();
        let output = page.element_by_id("typewriter-text").unwrap();
        assert_eq!(page.text_content(output), "");

        effect.frame(&mut page, at(0.0, 0.0));
        for _ in 0..100 {
            effect.frame(&mut page, at(400.0, -400.0));
        }
        assert_eq!(page.text_content(output), "abc");

        let mut bare = Document::parse(r#"<html><body><p id="typewriter-text"></p></body></html>"#);
        assert!(TypewriterEffect::attach(&mut bare, &config("abc")).is_none());
    }
}
