//! Error types for the ingestion pipeline.
//!
//! All fallible operations in this crate return [`IngestError`]. The variants
//! mirror how failures are handled at runtime:
//!
//! - [`IngestError::Upstream`] and [`IngestError::MissingField`] abort the
//!   current ticker (the pipeline logs them and moves on to the next one).
//! - [`IngestError::Status`] marks a single article fetch that came back
//!   non-2xx; the pipeline degrades that one record to null fields.
//! - Everything else propagates with `?`.

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The news search API returned a non-success status code.
    #[error("search API returned {status}: {body}")]
    Upstream {
        /// The HTTP status code.
        status: u16,
        /// The response body, truncated for display.
        body: String,
    },

    /// A search hit was missing one of its required fields.
    #[error("search response entry missing field `{0}`")]
    MissingField(&'static str),

    /// A search hit carried a field we could not interpret.
    #[error("search response field `{field}` is malformed: {value}")]
    MalformedField {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value as received.
        value: String,
    },

    /// An article URL returned a non-success status code.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// An error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A JSON document could not be decoded.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// A database operation failed.
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    /// A CSV file could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}
