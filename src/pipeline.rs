//! The ingestion pipeline: search, fan-out fetch/extract, persist.
//!
//! Tickers are processed one at a time. For each ticker the pipeline asks
//! the search API for article hits, downloads and extracts every hit URL
//! concurrently on a bounded worker pool, zips the extraction output back
//! with the hits positionally, and hands the assembled batch to the sink
//! in one unit.
//!
//! # Failure policy
//!
//! - A search failure aborts that ticker only; the run continues with the
//!   next ticker.
//! - A fetch or extraction failure degrades that one record to null
//!   title/body; the batch still contains one record per hit.
//! - A sink failure counts the ticker as failed and the run continues.
//!
//! # Ordering
//!
//! Record order within a batch always matches the search response order.
//! The fan-out uses `buffered`, which yields results in input order no
//! matter which downloads finish first.

use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

use crate::config::Settings;
use crate::error::IngestError;
use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::models::{ArticleRecord, ExtractedArticle, TickerEntry};
use crate::search::SearchClient;
use crate::store::ArticleSink;
use crate::utils::default_concurrency;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Tickers whose batch reached the sink (or had zero hits).
    pub tickers_processed: usize,
    /// Tickers aborted by a search or sink failure.
    pub tickers_failed: usize,
    /// Total records handed to the sink.
    pub records_stored: usize,
}

/// Orchestrates the per-ticker search → fetch → extract → persist flow.
pub struct Pipeline {
    search: SearchClient,
    fetcher: Fetcher,
    concurrency: usize,
}

impl Pipeline {
    /// Build the pipeline's clients from settings.
    pub fn new(settings: &Settings) -> Result<Self, IngestError> {
        Ok(Self {
            search: SearchClient::new(&settings.search)?,
            fetcher: Fetcher::new(&settings.fetch)?,
            concurrency: settings
                .fetch
                .concurrency
                .unwrap_or_else(default_concurrency)
                .max(1),
        })
    }

    /// Ingest news for every ticker in the list, sequentially.
    pub async fn run<S: ArticleSink>(
        &self,
        sink: &S,
        tickers: &[TickerEntry],
        count: u32,
    ) -> RunSummary {
        info!(
            tickers = tickers.len(),
            count,
            concurrency = self.concurrency,
            "Starting ingestion run"
        );

        let mut summary = RunSummary::default();
        for entry in tickers {
            match self.ingest_ticker(sink, entry, count).await {
                Ok(stored) => {
                    summary.tickers_processed += 1;
                    summary.records_stored += stored;
                }
                Err(e) => {
                    error!(
                        ticker = %entry.symbol,
                        error = %e,
                        "Ticker failed; continuing with next"
                    );
                    summary.tickers_failed += 1;
                }
            }
        }

        info!(
            processed = summary.tickers_processed,
            failed = summary.tickers_failed,
            records = summary.records_stored,
            "Ingestion run complete"
        );
        summary
    }

    /// Process one ticker end to end; returns the number of records stored.
    #[instrument(level = "info", skip_all, fields(ticker = %entry.symbol))]
    async fn ingest_ticker<S: ArticleSink>(
        &self,
        sink: &S,
        entry: &TickerEntry,
        count: u32,
    ) -> Result<usize, IngestError> {
        let hits = self.search.search(&entry.symbol, count).await?;
        if hits.is_empty() {
            info!("No search hits");
            return Ok(0);
        }

        let extractions: Vec<ExtractedArticle> =
            stream::iter(hits.iter().map(|hit| hit.url.clone()))
                .map(|url| async move {
                    match self.fetcher.fetch(&url).await {
                        Ok(html) => extract(&html),
                        Err(e) => {
                            warn!(%url, error = %e, "Fetch failed; storing record without content");
                            ExtractedArticle::default()
                        }
                    }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let batch: Vec<ArticleRecord> = hits
            .into_iter()
            .zip(extractions)
            .map(|(hit, extracted)| ArticleRecord::assemble(&entry.symbol, hit, extracted))
            .collect();

        sink.insert_batch(&batch).await?;
        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseSettings, FetchSettings, SearchSettings};
    use httpmock::{Method::GET, MockServer};
    use std::sync::Mutex;

    /// Sink that records every batch it receives.
    #[derive(Default)]
    struct VecSink {
        batches: Mutex<Vec<Vec<ArticleRecord>>>,
    }

    impl ArticleSink for VecSink {
        async fn insert_batch(&self, batch: &[ArticleRecord]) -> Result<(), IngestError> {
            self.batches.lock().unwrap().push(batch.to_vec());
            Ok(())
        }
    }

    /// Sink that rejects every batch.
    struct FailingSink;

    impl ArticleSink for FailingSink {
        async fn insert_batch(&self, _batch: &[ArticleRecord]) -> Result<(), IngestError> {
            Err(IngestError::Io(std::io::Error::other("sink down")))
        }
    }

    fn settings_for(server: &MockServer) -> Settings {
        Settings {
            search: SearchSettings {
                endpoint: server.url("/news/search"),
                api_key: "test-key".to_string(),
            },
            database: DatabaseSettings {
                host: "localhost".to_string(),
                port: 5432,
                user: "u".to_string(),
                password: "p".to_string(),
                dbname: "d".to_string(),
            },
            tickers_file: "tickers.json".to_string(),
            fetch: FetchSettings {
                timeout_secs: 5,
                concurrency: Some(2),
            },
        }
    }

    fn ticker(symbol: &str) -> TickerEntry {
        TickerEntry {
            symbol: symbol.to_string(),
            company: format!("{symbol} Inc."),
        }
    }

    fn hit_json(description: &str, url: &str) -> String {
        format!(
            r#"{{"description": "{description}", "url": "{url}",
                "datePublished": "2017-05-06T12:00:00Z"}}"#
        )
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_null_fields_without_dropping_the_hit() {
        let server = MockServer::start();
        let broken_url = server.url("/articles/broken");
        let good_url = server.url("/articles/good");

        server.mock(|when, then| {
            when.method(GET).path("/news/search").query_param("q", "AAPL");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!(
                    r#"{{"value": [{}, {}]}}"#,
                    hit_json("first", &broken_url),
                    hit_json("second", &good_url)
                ));
        });
        server.mock(|when, then| {
            when.method(GET).path("/articles/broken");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/articles/good");
            then.status(200)
                .body("<html><body><script>x</script><p>Hello  World</p></body></html>");
        });

        let pipeline = Pipeline::new(&settings_for(&server)).unwrap();
        let sink = VecSink::default();
        let summary = pipeline.run(&sink, &[ticker("AAPL")], 2).await;

        assert_eq!(summary.tickers_processed, 1);
        assert_eq!(summary.tickers_failed, 0);
        assert_eq!(summary.records_stored, 2);

        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.len(), 2);

        assert_eq!(batch[0].url, broken_url);
        assert_eq!(batch[0].description, "first");
        assert!(batch[0].title.is_none());
        assert!(batch[0].body.is_none());

        assert_eq!(batch[1].url, good_url);
        assert_eq!(batch[1].description, "second");
        assert_eq!(batch[1].body.as_deref(), Some("Hello\nWorld"));
    }

    #[tokio::test]
    async fn search_failure_aborts_only_that_ticker() {
        let server = MockServer::start();
        let article_url = server.url("/articles/ok");

        server.mock(|when, then| {
            when.method(GET).path("/news/search").query_param("q", "BAD");
            then.status(403).body("Forbidden");
        });
        server.mock(|when, then| {
            when.method(GET).path("/news/search").query_param("q", "GOOD");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!(r#"{{"value": [{}]}}"#, hit_json("ok", &article_url)));
        });
        server.mock(|when, then| {
            when.method(GET).path("/articles/ok");
            then.status(200).body("<html><body><p>text</p></body></html>");
        });

        let pipeline = Pipeline::new(&settings_for(&server)).unwrap();
        let sink = VecSink::default();
        let summary = pipeline
            .run(&sink, &[ticker("BAD"), ticker("GOOD")], 1)
            .await;

        assert_eq!(summary.tickers_failed, 1);
        assert_eq!(summary.tickers_processed, 1);
        assert_eq!(summary.records_stored, 1);

        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].ticker, "GOOD");
    }

    #[tokio::test]
    async fn record_order_matches_search_order() {
        let server = MockServer::start();
        let urls: Vec<String> = (0..3)
            .map(|i| server.url(format!("/articles/{i}")))
            .collect();

        let hits = urls
            .iter()
            .enumerate()
            .map(|(i, url)| hit_json(&format!("hit-{i}"), url))
            .collect::<Vec<_>>()
            .join(", ");
        server.mock(|when, then| {
            when.method(GET).path("/news/search").query_param("q", "AAPL");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!(r#"{{"value": [{hits}]}}"#));
        });
        for i in 0..3 {
            server.mock(|when, then| {
                when.method(GET).path(format!("/articles/{i}"));
                then.status(200)
                    .body(format!("<html><body><p>body-{i}</p></body></html>"));
            });
        }

        let pipeline = Pipeline::new(&settings_for(&server)).unwrap();
        let sink = VecSink::default();
        pipeline.run(&sink, &[ticker("AAPL")], 3).await;

        let batches = sink.batches.lock().unwrap();
        let batch = &batches[0];
        for (i, record) in batch.iter().enumerate() {
            assert_eq!(record.description, format!("hit-{i}"));
            assert_eq!(record.url, urls[i]);
            assert_eq!(record.body.as_deref(), Some(format!("body-{i}").as_str()));
        }
    }

    #[tokio::test]
    async fn zero_hits_store_nothing_but_count_as_processed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/news/search");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"value": []}"#);
        });

        let pipeline = Pipeline::new(&settings_for(&server)).unwrap();
        let sink = VecSink::default();
        let summary = pipeline.run(&sink, &[ticker("AAPL")], 1).await;

        assert_eq!(summary.tickers_processed, 1);
        assert_eq!(summary.records_stored, 0);
        assert!(sink.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sink_failure_counts_the_ticker_as_failed() {
        let server = MockServer::start();
        let article_url = server.url("/articles/ok");
        server.mock(|when, then| {
            when.method(GET).path("/news/search");
            then.status(200)
                .header("content-type", "application/json")
                .body(format!(r#"{{"value": [{}]}}"#, hit_json("d", &article_url)));
        });
        server.mock(|when, then| {
            when.method(GET).path("/articles/ok");
            then.status(200).body("<html><body><p>text</p></body></html>");
        });

        let pipeline = Pipeline::new(&settings_for(&server)).unwrap();
        let summary = pipeline.run(&FailingSink, &[ticker("AAPL")], 1).await;

        assert_eq!(summary.tickers_processed, 0);
        assert_eq!(summary.tickers_failed, 1);
        assert_eq!(summary.records_stored, 0);
    }
}
