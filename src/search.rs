//! News search API client.
//!
//! One GET per ticker against a Bing-style news search endpoint, with the
//! subscription key in a header and `q`/`count` as query parameters. The
//! JSON response is decoded through a permissive wire representation and
//! then validated field-by-field into [`SearchResult`]s.
//!
//! # Failure semantics
//!
//! - Any non-2xx status fails the whole call with [`IngestError::Upstream`],
//!   carrying the status code and a truncated response body.
//! - A hit missing `description`, `url`, or `datePublished` fails the whole
//!   call — there is no partial-entry tolerance, so callers either get every
//!   hit or none.
//! - No retry and no pagination; callers wanting more hits raise `count`.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

use crate::config::SearchSettings;
use crate::error::IngestError;
use crate::models::SearchResult;
use crate::utils::truncate_for_log;

/// Header carrying the subscription key on every search request.
const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Maximum bytes of an upstream error body kept in error messages.
const ERROR_BODY_PREVIEW: usize = 300;

/// Client for the news search API.
pub struct SearchClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl SearchClient {
    /// Build a client from the configured endpoint and key.
    pub fn new(settings: &SearchSettings) -> Result<Self, IngestError> {
        Ok(Self {
            http: Client::builder().build()?,
            endpoint: Url::parse(&settings.endpoint)?,
            api_key: settings.api_key.clone(),
        })
    }

    /// Search news for a ticker, requesting up to `count` hits (`count` ≥ 1).
    ///
    /// Hits are returned in response order.
    #[instrument(level = "info", skip_all, fields(%ticker, count))]
    pub async fn search(
        &self,
        ticker: &str,
        count: u32,
    ) -> Result<Vec<SearchResult>, IngestError> {
        debug_assert!(count >= 1, "search count must be at least 1");

        let count_param = count.to_string();
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("q", ticker), ("count", count_param.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(IngestError::Upstream {
                status: status.as_u16(),
                body: truncate_for_log(&body, ERROR_BODY_PREVIEW),
            });
        }

        let envelope: wire::SearchEnvelope = serde_json::from_str(&body)?;
        let hits = envelope.value.ok_or(IngestError::MissingField("value"))?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            results.push(validate_hit(hit)?);
        }

        info!(hits = results.len(), "Search completed");
        Ok(results)
    }
}

/// Promote a wire hit to a [`SearchResult`], failing on any absent or
/// uninterpretable required field.
fn validate_hit(hit: wire::SearchHit) -> Result<SearchResult, IngestError> {
    let description = hit
        .description
        .ok_or(IngestError::MissingField("description"))?;
    let url = hit.url.ok_or(IngestError::MissingField("url"))?;
    let raw = hit
        .date_published
        .ok_or(IngestError::MissingField("datePublished"))?;
    let published = parse_published(&raw).ok_or(IngestError::MalformedField {
        field: "datePublished",
        value: raw.clone(),
    })?;

    Ok(SearchResult {
        description,
        url,
        published,
    })
}

/// Parse the API's publication timestamp.
///
/// The endpoint emits RFC 3339 timestamps, sometimes without an offset;
/// offset-less values are taken as UTC.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Wire-level mirror of the search response, all fields optional.
mod wire {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct SearchEnvelope {
        pub(super) value: Option<Vec<SearchHit>>,
    }

    #[derive(Deserialize)]
    pub(super) struct SearchHit {
        pub(super) description: Option<String>,
        pub(super) url: Option<String>,
        #[serde(rename = "datePublished")]
        pub(super) date_published: Option<String>,
    }
}
