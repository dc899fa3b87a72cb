//! Translation pass and language option handling.

use std::collections::BTreeMap;

use crate::dom::{Document, ElementLookup, ElementQuery, NodeId};
use crate::error::{AppError, Result};
use crate::models::{Config, I18nConfig, PageSession};

const LANG_OPTION: &str = ".lang-option";

/// Writes translated strings into the page by element id.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    tables: BTreeMap<String, BTreeMap<String, String>>,
    i18n: I18nConfig,
}

impl Translator {
    pub fn new(tables: BTreeMap<String, BTreeMap<String, String>>, i18n: I18nConfig) -> Self {
        Self { tables, i18n }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.translations.clone(), config.i18n.clone())
    }

    /// Languages with a translation table.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Switch the page to `lang`.
    ///
    /// Every key of the table whose element exists gets its text replaced.
    /// Returns the number of translated elements. An unknown language leaves
    /// both the page and the session untouched.
    pub fn set_language(
        &self,
        page: &mut Document,
        session: &mut PageSession,
        lang: &str,
    ) -> Result<usize> {
        log::info!("Setting language to: {lang}");
        let table = self.tables.get(lang).ok_or_else(|| {
            log::error!("Translation not found for: {lang}");
            AppError::language(lang)
        })?;

        session.language = lang.to_string();
        let translated = Self::write_table(page, table);
        self.mark_active_option(page, lang);
        Ok(translated)
    }

    /// Re-run the pass for the session's current language.
    pub fn reapply(&self, page: &mut Document, session: &PageSession) -> Result<usize> {
        let table = self
            .tables
            .get(&session.language)
            .ok_or_else(|| AppError::language(&session.language))?;
        Ok(Self::write_table(page, table))
    }

    /// Handle a click that may have landed on a `.lang-option`.
    ///
    /// Returns `None` when the click was elsewhere or the label is unknown.
    pub fn handle_click(
        &self,
        page: &mut Document,
        session: &mut PageSession,
        target: NodeId,
    ) -> Option<Result<usize>> {
        let option = page
            .query_all(LANG_OPTION)
            .ok()?
            .into_iter()
            .find(|opt| page.contains(*opt, target))?;

        let label = page.text_content(option);
        log::debug!("Clicked language option: {}", label.trim());
        let code = self.i18n.code_for_label(&label)?.to_string();
        Some(self.set_language(page, session, &code))
    }

    fn write_table(page: &mut Document, table: &BTreeMap<String, String>) -> usize {
        let mut translated = 0;
        for (key, text) in table {
            match page.element_by_id(key) {
                Some(element) => {
                    page.set_text(element, text);
                    translated += 1;
                    log::debug!("Translated {key}");
                }
                None => log::warn!("Element not found: {key}"),
            }
        }
        log::info!("Total translated: {translated} elements");
        translated
    }

    fn mark_active_option(&self, page: &mut Document, lang: &str) {
        let Ok(options) = page.query_all(LANG_OPTION) else {
            return;
        };
        for option in options {
            let label = page.text_content(option);
            let active = self.i18n.code_for_label(&label) == Some(lang);
            page.toggle_class(option, "active", active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="lang-menu">
            <a class="lang-option active">EN</a>
            <a class="lang-option"> FR </a>
            <a class="lang-option"><span>中文</span></a>
        </div>
        <h1 id="headerTitle">Articles &amp; Ideas</h1>
        <p id="headerSubtitle">Exploring userism</p>
    </body></html>"#;

    fn translator() -> Translator {
        let mut tables = BTreeMap::new();
        tables.insert(
            "fr".to_string(),
            BTreeMap::from([
                ("headerTitle".to_string(), "Articles & Idées".to_string()),
                ("headerSubtitle".to_string(), "Explorer le userisme".to_string()),
                ("article1Title".to_string(), "Qu'est-ce que l'userisme ?".to_string()),
            ]),
        );
        tables.insert(
            "zh".to_string(),
            BTreeMap::from([("headerTitle".to_string(), "文章与思想".to_string())]),
        );
        Translator::new(tables, I18nConfig::default())
    }

    #[test]
    fn writes_known_keys_and_skips_missing_elements() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");

        let count = translator()
            .set_language(&mut page, &mut session, "fr")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.language, "fr");

        let title = page.element_by_id("headerTitle").unwrap();
        assert_eq!(page.text_content(title), "Articles & Idées");
    }

    #[test]
    fn marks_matching_option_active() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");
        translator()
            .set_language(&mut page, &mut session, "fr")
            .unwrap();

        let options = page.query_all(LANG_OPTION).unwrap();
        let active: Vec<bool> = options
            .iter()
            .map(|o| page.has_class(*o, "active"))
            .collect();
        assert_eq!(active, [false, true, false]);
    }

    #[test]
    fn unknown_language_changes_nothing() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");
        let before = page.to_html();

        let err = translator()
            .set_language(&mut page, &mut session, "de")
            .unwrap_err();
        assert!(matches!(err, AppError::Language(_)));
        assert_eq!(session.language, "en");
        assert_eq!(page.to_html(), before);
    }

    #[test]
    fn click_on_nested_option_label_switches_language() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");
        let span = page.query(".lang-option span").unwrap().unwrap();

        let result = translator().handle_click(&mut page, &mut session, span);
        assert_eq!(result.unwrap().unwrap(), 1);
        assert_eq!(session.language, "zh");
    }

    #[test]
    fn click_elsewhere_is_ignored() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");
        let title = page.element_by_id("headerTitle").unwrap();
        assert!(translator()
            .handle_click(&mut page, &mut session, title)
            .is_none());
    }

    #[test]
    fn reapply_uses_session_language() {
        let mut page = Document::parse(PAGE);
        let mut session = PageSession::new("/", "en");
        let translator = translator();
        translator
            .set_language(&mut page, &mut session, "fr")
            .unwrap();

        let title = page.element_by_id("headerTitle").unwrap();
        page.set_text(title, "reset");
        assert_eq!(translator.reapply(&mut page, &session).unwrap(), 2);
        assert_eq!(page.text_content(title), "Articles & Idées");
    }
}
