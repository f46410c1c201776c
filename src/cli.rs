//! Command-line interface definitions.
//!
//! The binary has three modes, dispatched in this order:
//!
//! 1. A positional `TICKER` dumps previously stored articles for that
//!    symbol to `<TICKER>.csv` (or stdout with `--buffer`).
//! 2. `--init` creates the `articles` table and exits.
//! 3. Otherwise the scrape pipeline runs, requesting `--scrape` results
//!    per configured ticker.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Ingest 200 articles per ticker (the default)
/// ticker_news
///
/// # Ingest 25 articles per ticker with a custom settings file
/// ticker_news --scrape 25 --config /etc/ticker_news/config.yaml
///
/// # Create the articles table
/// ticker_news --init
///
/// # Dump stored AAPL articles to AAPL.csv, or to stdout
/// ticker_news AAPL
/// ticker_news AAPL --buffer
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Number of search results to request per ticker
    #[arg(short, long, value_name = "COUNT", default_value_t = 200)]
    pub scrape: u32,

    /// Create the articles table, then exit
    #[arg(long)]
    pub init: bool,

    /// Dump stored articles for this ticker, then exit
    pub ticker: Option<String>,

    /// With a ticker: print rows to stdout instead of writing a CSV file
    #[arg(short, long)]
    pub buffer: bool,

    /// Path to the settings file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ticker_news"]);
        assert_eq!(cli.scrape, 200);
        assert!(!cli.init);
        assert!(cli.ticker.is_none());
        assert!(!cli.buffer);
        assert_eq!(cli.config, "config.yaml");
    }

    #[test]
    fn test_scrape_count() {
        let cli = Cli::parse_from(["ticker_news", "--scrape", "25"]);
        assert_eq!(cli.scrape, 25);
    }

    #[test]
    fn test_ticker_with_buffer() {
        let cli = Cli::parse_from(["ticker_news", "AAPL", "-b"]);
        assert_eq!(cli.ticker.as_deref(), Some("AAPL"));
        assert!(cli.buffer);
    }

    #[test]
    fn test_init_flag() {
        let cli = Cli::parse_from(["ticker_news", "--init"]);
        assert!(cli.init);
    }

    #[test]
    fn test_config_short_flag() {
        let cli = Cli::parse_from(["ticker_news", "-c", "/tmp/settings.yaml"]);
        assert_eq!(cli.config, "/tmp/settings.yaml");
    }
}
