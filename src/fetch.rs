//! Article page fetcher.
//!
//! Plain HTTP GET with a fixed browser-identifying user agent, since a
//! handful of outlets refuse requests from obvious non-browser clients.
//! Requests carry a bounded timeout (configurable, 10s by default) so one
//! stalled server cannot hang a batch.
//!
//! The fetcher itself fails loudly on any error; deciding whether a failed
//! fetch aborts the run or degrades to an empty record is the pipeline's
//! call, not this module's.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::FetchSettings;
use crate::error::IngestError;

/// Browser user agent sent with every article request.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// HTTP client for downloading article pages.
pub struct Fetcher {
    http: Client,
}

impl Fetcher {
    /// Build a fetcher with the configured timeout.
    pub fn new(settings: &FetchSettings) -> Result<Self, IngestError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { http })
    }

    /// Download the raw HTML of one article page.
    ///
    /// Returns [`IngestError::Status`] on a non-success response.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str) -> Result<String, IngestError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched article page");
        Ok(body)
    }
}
