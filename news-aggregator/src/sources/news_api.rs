use crate::fetcher::Fetcher;
use crate::normalize::{normalize_article, parse_timestamp, RawArticle};
use crate::traits::PullSource;
use crate::types::{AuthError, PullReport, QuerySpec, Result, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const DEFAULT_SOURCE_LABEL: &str = "NewsData.io";

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    status: Option<String>,
    #[serde(rename = "totalResults")]
    total_results: Option<u64>,
    results: Option<Vec<NewsDataItem>>,
}

#[derive(Debug, Deserialize)]
struct NewsDataItem {
    title: Option<String>,
    link: Option<String>,
    source_id: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

impl NewsDataItem {
    fn into_raw(self) -> RawArticle {
        RawArticle {
            title: self.title,
            url: self.link,
            source: self
                .source_id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string()),
            published: self.pub_date.as_deref().and_then(parse_timestamp),
            description: self.description,
            content: self.content,
        }
    }
}

/// Runs a fixed list of searches against the NewsData.io `latest` endpoint.
pub struct NewsApiSource {
    fetcher: Arc<Fetcher>,
    endpoint: String,
    api_key: String,
    queries: Vec<QuerySpec>,
}

impl NewsApiSource {
    pub fn new(fetcher: Arc<Fetcher>, endpoint: String, api_key: String, queries: Vec<QuerySpec>) -> Self {
        Self {
            fetcher,
            endpoint,
            api_key,
            queries,
        }
    }

    async fn fetch_query(&self, query: &QuerySpec, now: DateTime<Utc>) -> Result<PullReport> {
        let mut params = vec![("apikey", self.api_key.clone())];
        params.extend(query.params());

        let response = self.fetcher.get_with_query(&self.endpoint, &params).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(AuthError { status: StatusCode::UNAUTHORIZED.as_u16() }.into());
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(SourceError::RateLimited {
                    source_name: self.source_name(),
                });
            }
            status if !status.is_success() => {
                return Err(SourceError::Unavailable {
                    source_name: self.source_name(),
                    reason: format!("HTTP {}", status),
                });
            }
            _ => {}
        }

        let body: NewsDataResponse = response.json().await.map_err(|e| SourceError::Unavailable {
            source_name: self.source_name(),
            reason: format!("malformed response: {}", e.without_url()),
        })?;
        debug!(status = ?body.status, total_results = ?body.total_results, "News API response");

        let items = body.results.unwrap_or_default();
        if items.is_empty() {
            info!(query = %query.label(), "News API: 0 results for query");
        }

        let mut report = PullReport::default();
        for item in items {
            let raw = item.into_raw();
            let label = raw.title.clone().unwrap_or_default();
            match normalize_article(raw, now) {
                Some(article) => report.articles.push(article),
                None => {
                    report.dropped += 1;
                    debug!(title = %label, "Skipped item with missing title/url");
                }
            }
        }
        Ok(report)
    }
}

#[async_trait]
impl PullSource for NewsApiSource {
    fn source_name(&self) -> String {
        DEFAULT_SOURCE_LABEL.to_string()
    }

    async fn pull(&self, now: DateTime<Utc>) -> std::result::Result<PullReport, AuthError> {
        let mut report = PullReport::default();

        for query in &self.queries {
            match self.fetch_query(query, now).await {
                Ok(partial) => report.absorb(partial),
                Err(SourceError::Auth(e)) => {
                    error!(error = %e, "News API credential rejected");
                    return Err(e);
                }
                Err(SourceError::RateLimited { .. }) => {
                    warn!("News API rate limit hit; continuing with RSS feeds only");
                    report.rate_limited = true;
                    break;
                }
                Err(e) => {
                    warn!(query = %query.label(), error = %e, "News API query failed; skipping");
                    report.failed_sources += 1;
                }
            }
        }

        info!(
            articles = report.articles.len(),
            dropped = report.dropped,
            "News API: fetched articles"
        );
        Ok(report)
    }
}
