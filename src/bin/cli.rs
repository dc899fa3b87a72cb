//! pagewire CLI
//!
//! Runs the site's page behaviours against pages served from `fetch.base_url`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use pagewire::{
    error::Result,
    models::{Config, ContentKind},
    pipeline::{self, PageContext},
    utils::http::{HttpFetcher, NoDelay, TokioDelay},
};

/// pagewire - page behaviours for the Userism site
#[derive(Parser, Debug)]
#[command(
    name = "pagewire",
    version,
    about = "Render site pages with previews, navbar and translations applied"
)]
struct Cli {
    /// Path to the site configuration file
    #[arg(short, long, default_value = "data/site.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a page and write it out after both lifecycle events
    Render {
        /// Page path relative to the site root
        #[arg(long, default_value = "index.html")]
        page: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Language to apply before previews load
        #[arg(long)]
        lang: Option<String>,

        /// Do not wait for the intro animation timers
        #[arg(long)]
        skip_intro: bool,
    },

    /// Populate one preview container and print the outcome as JSON
    Preview {
        /// articles or events
        kind: ContentKind,

        /// Page the preview is shown on
        #[arg(long, default_value = "index.html")]
        page: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn context(config: Config, skip_intro: bool) -> Result<PageContext> {
    let base = pipeline::base_url(&config)?;
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch, base)?);
    let ctx = PageContext::new(config, fetcher, Arc::new(TokioDelay));
    Ok(if skip_intro {
        ctx.with_animation(Arc::new(NoDelay))
    } else {
        ctx
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Render {
            page,
            output,
            lang,
            skip_intro,
        } => {
            let ctx = context(config, skip_intro)?;
            let url = pipeline::base_url(&ctx.config)?.join(&page)?;
            let seed = u64::from(Utc::now().timestamp_subsec_nanos());

            let html = pipeline::run_render(&ctx, &url, lang.as_deref(), seed).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, html).await?;
                    log::info!("Wrote {}", path.display());
                }
                None => println!("{html}"),
            }
        }

        Command::Preview { kind, page } => {
            let ctx = context(config, true)?;
            let url = pipeline::base_url(&ctx.config)?.join(&page)?;

            let outcome = pipeline::run_preview(&ctx, kind, &url).await;
            let report = serde_json::json!({
                "kind": kind,
                "page": url.as_str(),
                "checked_at": Utc::now(),
                "result": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Validate => pipeline::run_validate(&config)?,
    }

    Ok(())
}
