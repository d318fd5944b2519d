//! HTTP fetch of feed bodies.

use std::time::Duration;

use crate::error::RssError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around a `reqwest` client configured for feed polling.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    /// Build a fetcher with the standard feed-fetch timeout.
    ///
    /// # Panics
    ///
    /// Panics if the underlying TLS backend cannot be initialised.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client builds");
        Self { client }
    }

    /// Fetch the feed body at `url`.
    pub async fn fetch(&self, url: &str) -> Result<String, RssError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RssError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let response = response.error_for_status().map_err(|source| RssError::Fetch {
            url: url.to_string(),
            source,
        })?;
        response.text().await.map_err(|source| RssError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}
