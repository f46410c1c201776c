//! Per-ticker export of stored articles to CSV or stdout.

use std::path::Path;
use tracing::{info, instrument};

use crate::error::IngestError;
use crate::store::{ArticleRow, PgStore};

/// Dump every stored row for a ticker.
///
/// Writes `<TICKER>.csv` in the working directory, or prints the rows to
/// stdout when `to_stdout` is set.
#[instrument(level = "info", skip_all, fields(%ticker, to_stdout))]
pub async fn dump_ticker(
    store: &PgStore,
    ticker: &str,
    to_stdout: bool,
) -> Result<(), IngestError> {
    let rows = store.rows_for_ticker(ticker).await?;
    info!(rows = rows.len(), "Fetched stored articles");

    if to_stdout {
        print_rows(&rows);
    } else {
        let path = format!("{ticker}.csv");
        write_csv(&rows, &path)?;
        info!(%path, "Wrote CSV export");
    }
    Ok(())
}

/// Write rows as CSV with a header line.
pub fn write_csv(rows: &[ArticleRow], path: impl AsRef<Path>) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "id",
        "ticker",
        "link",
        "title",
        "description",
        "content",
        "published",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.ticker.clone().unwrap_or_default(),
            row.link.clone().unwrap_or_default(),
            row.title.clone().unwrap_or_default(),
            row.description.clone().unwrap_or_default(),
            row.content.clone().unwrap_or_default(),
            row.published.map(|ts| ts.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Print rows to stdout, one per line.
pub fn print_rows(rows: &[ArticleRow]) {
    for row in rows {
        println!("{row:?}");
    }
}
