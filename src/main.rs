//! # Bankier RSS
//!
//! Scrapes the news section of Bankier.pl and publishes it as an RSS 2.0
//! feed file.
//!
//! ## Usage
//!
//! ```sh
//! bankier_rss -o ./rss.xml
//! ```
//!
//! ## Architecture
//!
//! The run is a sequential pipeline:
//! 1. **Listing**: fetch each listing page and extract candidate articles
//! 2. **Dating**: fetch article pages for candidates without an inline date
//! 3. **Output**: serialize every record into one RSS document and write it
//!
//! No failure aborts the run. The worst case is an empty, valid feed.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use http::HttpFetcher;
use outputs::rss::{Channel, FeedContext, write_feed};
use scrapers::bankier::BankierScraper;
use utils::ensure_output_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("Starting Bankier.pl RSS scraper");

    let args = Cli::parse();
    debug!(output = %args.output.display(), pages = args.pages, timezone = %args.timezone, "Parsed CLI arguments");

    if let Err(e) = ensure_output_dir(&args.output).await {
        warn!(
            path = %args.output.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
    }

    // ---- Scrape ----
    let records = match HttpFetcher::new() {
        Ok(fetcher) => {
            BankierScraper::new(fetcher, args.timezone)
                .with_pages(args.pages)
                .scrape()
                .await
        }
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client; writing empty feed");
            Vec::new()
        }
    };
    if records.is_empty() {
        info!("No articles found; the feed will have no items");
    }

    // ---- RSS output ----
    let now = Utc::now().with_timezone(&args.timezone);
    let ctx = FeedContext::new(Channel::bankier(), args.timezone, now);
    if let Err(e) = write_feed(&records, &ctx, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed writing RSS feed");
    } else {
        info!(path = %args.output.display(), items = records.len(), "RSS feed generated");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
