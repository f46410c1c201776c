//! Postgres persistence for assembled article records.
//!
//! The pipeline talks to storage through the [`ArticleSink`] trait so the
//! ingestion logic stays independent of the concrete backend. [`PgStore`]
//! is the production implementation: a connection pool acquired once per
//! run, one transaction per ticker batch, and a single retry with a short
//! jittered delay when a batch fails to commit.

use chrono::NaiveDateTime;
use rand::{Rng, rng};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DatabaseSettings;
use crate::error::IngestError;
use crate::models::ArticleRecord;

/// Destination for per-ticker record batches.
pub trait ArticleSink {
    /// Persist one ticker's batch as a unit.
    async fn insert_batch(&self, batch: &[ArticleRecord]) -> Result<(), IngestError>;
}

const CREATE_ARTICLES_TABLE: &str = "CREATE TABLE articles (
    id          SERIAL      PRIMARY KEY,
    ticker      VARCHAR(10) NULL,
    link        TEXT        NULL,
    title       TEXT        NULL,
    description TEXT        NULL,
    content     TEXT        NULL,
    published   TIMESTAMP   NULL
)";

const INSERT_ARTICLE: &str = "INSERT INTO articles
    (ticker, link, title, description, content, published)
    VALUES ($1, $2, $3, $4, $5, $6)";

/// One stored row, as returned by per-ticker queries.
#[derive(Debug, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i32,
    pub ticker: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published: Option<NaiveDateTime>,
}

/// Postgres-backed article store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool against the configured database.
    ///
    /// The pool lives for the duration of the run and is released when the
    /// store is dropped.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, IngestError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&settings.url())
            .await?;
        info!(
            host = %settings.host,
            dbname = %settings.dbname,
            "Connected to Postgres"
        );
        Ok(Self { pool })
    }

    /// Create the `articles` table.
    ///
    /// Fails if the table already exists, matching the one-shot `--init`
    /// usage.
    pub async fn init_tables(&self) -> Result<(), IngestError> {
        sqlx::query(CREATE_ARTICLES_TABLE)
            .execute(&self.pool)
            .await?;
        info!("Created articles table");
        Ok(())
    }

    /// All stored rows for a ticker, oldest insert first.
    pub async fn rows_for_ticker(&self, ticker: &str) -> Result<Vec<ArticleRow>, IngestError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, ticker, link, title, description, content, published
             FROM articles WHERE ticker = $1 ORDER BY id",
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn try_insert(&self, batch: &[ArticleRecord]) -> Result<(), IngestError> {
        let mut tx = self.pool.begin().await?;
        for record in batch {
            sqlx::query(INSERT_ARTICLE)
                .bind(&record.ticker)
                .bind(&record.url)
                .bind(&record.title)
                .bind(&record.description)
                .bind(&record.body)
                .bind(record.published.naive_utc())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

impl ArticleSink for PgStore {
    async fn insert_batch(&self, batch: &[ArticleRecord]) -> Result<(), IngestError> {
        match self.try_insert(batch).await {
            Ok(()) => {
                info!(records = batch.len(), "Stored batch");
                Ok(())
            }
            Err(e) => {
                let jitter_ms: u64 = rng().random_range(50..=250);
                warn!(
                    error = %e,
                    delay_ms = jitter_ms,
                    "Batch insert failed; retrying once"
                );
                sleep(Duration::from_millis(jitter_ms)).await;
                self.try_insert(batch).await
            }
        }
    }
}
