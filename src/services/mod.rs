//! Page behaviours.
//!
//! Each service binds to the elements it needs on a parsed page and either
//! runs once (previews, intro, navbar) or reacts to dispatched events
//! (menus, modals, language options, project search, reading-page buttons).

mod intro;
mod lang_menu;
mod menu;
mod modal;
pub mod navbar;
mod previews;
mod projects;
mod reading;
mod translate;
mod typewriter;

pub use intro::{IntroAnimation, IntroOutcome};
pub use lang_menu::LanguageDropdown;
pub use menu::{NavigationMenu, activate_current_page};
pub use modal::ArticleModal;
pub use previews::{PreviewLoader, error_state_markup, fallback_markup};
pub use projects::ProjectsPage;
pub use reading::{
    Navigation, ReadingOutcome, ReadingPage, ShareData, ShareOutcome, ShareSheet,
};
pub use translate::Translator;
pub use typewriter::{Typewriter, TypewriterEffect, Viewport};
