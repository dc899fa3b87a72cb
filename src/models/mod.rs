// src/models/mod.rs

//! Domain models for pagewire.
//!
//! Configuration, per-page session state and preview descriptions.

mod config;
mod page;
mod preview;

// Re-export all public types
pub use config::{Config, FetchConfig, I18nConfig, IntroConfig, PreviewConfig, TypewriterConfig};
pub use page::PageSession;
pub use preview::{Cap, ContentKind, PreviewOutcome, PreviewSpec};
