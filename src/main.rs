//! # Ticker News
//!
//! A news ingestion pipeline for stock tickers: queries a news search API
//! for each configured ticker, fetches every returned article URL, extracts
//! readable title and body text, and stores one record per search hit in a
//! Postgres `articles` table. Stored articles are queryable per ticker to
//! CSV or stdout.
//!
//! ## Usage
//!
//! ```sh
//! ticker_news --init          # create the articles table
//! ticker_news --scrape 50     # ingest 50 articles per configured ticker
//! ticker_news AAPL            # dump stored AAPL articles to AAPL.csv
//! ```
//!
//! ## Architecture
//!
//! For each ticker, sequentially:
//! 1. **Search**: one request to the news search API
//! 2. **Fetch + extract**: every hit URL downloaded and stripped to text,
//!    concurrently on a bounded worker pool, output kept in hit order
//! 3. **Persist**: the assembled batch inserted in one transaction

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod export;
mod extract;
mod fetch;
mod models;
mod pipeline;
mod search;
mod store;
mod utils;

use cli::Cli;
use config::Settings;
use models::load_tickers;
use pipeline::Pipeline;
use store::PgStore;

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
    info!("ticker_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(&args.config)?;
    let store = PgStore::connect(&settings.database).await?;

    if let Some(ref ticker) = args.ticker {
        export::dump_ticker(&store, ticker, args.buffer).await?;
    } else if args.init {
        store.init_tables().await?;
    } else {
        let tickers = load_tickers(&settings.tickers_file)?;
        info!(
            tickers = tickers.len(),
            path = %settings.tickers_file,
            "Loaded ticker list"
        );

        let pipeline = Pipeline::new(&settings)?;
        pipeline.run(&store, &tickers, args.scrape).await;
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
