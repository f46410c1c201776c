//! Data models for search hits, extracted articles, and persisted records.
//!
//! This module defines the data that flows through the pipeline:
//! - [`TickerEntry`]: one (symbol, company) pair from the ticker list file
//! - [`SearchResult`]: one hit from the news search API
//! - [`ExtractedArticle`]: title/body text pulled out of a fetched page
//! - [`ArticleRecord`]: the persisted unit, one per search hit

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::error::IngestError;

/// A stock symbol and the company it identifies.
///
/// The ticker list file is a JSON array of two-element arrays, e.g.
/// `[["AAPL", "Apple Inc."], ["MSFT", "Microsoft Corp."]]`, which
/// deserializes through the tuple form below.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "(String, String)")]
pub struct TickerEntry {
    /// The exchange symbol, e.g. `AAPL`.
    pub symbol: String,
    /// The company name, e.g. `Apple Inc.`.
    pub company: String,
}

impl From<(String, String)> for TickerEntry {
    fn from((symbol, company): (String, String)) -> Self {
        Self { symbol, company }
    }
}

/// Load the ticker list from a JSON file.
///
/// The list is read once per run and is read-only afterwards.
pub fn load_tickers(path: impl AsRef<Path>) -> Result<Vec<TickerEntry>, IngestError> {
    let raw = std::fs::read_to_string(path)?;
    let tickers = serde_json::from_str(&raw)?;
    Ok(tickers)
}

/// One hit returned by the news search API.
///
/// Hits keep the order of the API response; the pipeline's positional
/// guarantees are anchored to that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Snippet describing the article.
    pub description: String,
    /// Absolute URL of the article.
    pub url: String,
    /// Publication time as reported by the search API.
    pub published: DateTime<Utc>,
}

/// Title and body text extracted from a fetched article page.
///
/// Both fields are `None` when the fetch failed or the page had no
/// usable text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// The page title, when one was present.
    pub title: Option<String>,
    /// Cleaned body text, newline-separated.
    pub body: Option<String>,
}

/// The persisted unit: one search hit zipped with its extraction output.
///
/// Exactly one record exists per [`SearchResult`], even when fetching or
/// extraction failed; in that case `title` and `body` are `None`. No hit
/// is ever silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// The ticker this record was ingested for.
    pub ticker: String,
    /// The article URL.
    pub url: String,
    /// Extracted page title, when extraction succeeded.
    pub title: Option<String>,
    /// Search API snippet.
    pub description: String,
    /// Extracted body text, when extraction succeeded.
    pub body: Option<String>,
    /// Publication time from the search hit.
    pub published: DateTime<Utc>,
}

impl ArticleRecord {
    /// Assemble a record from a search hit and its extraction output.
    pub fn assemble(ticker: &str, hit: SearchResult, extracted: ExtractedArticle) -> Self {
        Self {
            ticker: ticker.to_string(),
            url: hit.url,
            title: extracted.title,
            description: hit.description,
            body: extracted.body,
            published: hit.published,
        }
    }
}
