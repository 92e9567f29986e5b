use crate::types::{FetchConfig, FeedSource, Result, SourceError};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared HTTP client for all sources. One request per call, no retries.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// GET with query parameters. The response is returned whatever its status.
    ///
    /// Request errors are stripped of their URL so credentials carried in the
    /// query string never reach the logs.
    pub async fn get_with_query(&self, url: &str, params: &[(&str, String)]) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Http(e.without_url()))?;
        Ok(response)
    }

    /// Fetch a feed document. Any non-2xx status is a failure for that feed.
    pub async fn fetch_feed(&self, feed: &FeedSource) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        debug!(source = %feed.name, url = %feed.url, "Fetching feed");

        let response = self.client.get(&feed.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                source_name: feed.name.clone(),
                reason: format!("HTTP {}", status),
            });
        }

        let body = response.bytes().await?;
        debug!(
            source = %feed.name,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        Ok(body.to_vec())
    }
}
