//! Pipeline entry points.
//!
//! - `SitePage`: one page view driven through its lifecycle events
//! - `run_render`: fetch a page and write out its fully loaded HTML
//! - `run_preview`: populate a single preview container
//! - `run_validate`: check the configuration

mod page;
mod render;

pub use page::{LoadReport, PageContext, SitePage};
pub use render::{base_url, run_preview, run_render, run_validate};
