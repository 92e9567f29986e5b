use crate::dedup::deduplicate;
use crate::fetcher::Fetcher;
use crate::sources::{NewsApiSource, RssFeedSource};
use crate::traits::PullSource;
use crate::types::{Article, AuthError, IngestConfig, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs every source in order and merges the results into one unique list.
pub struct NewsAggregator {
    sources: Vec<Box<dyn PullSource>>,
}

impl NewsAggregator {
    /// News API first (only when a credential is configured), then the feeds.
    pub fn new(config: IngestConfig) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(&config.fetch)?);
        let mut sources: Vec<Box<dyn PullSource>> = Vec::new();

        match config.api_key() {
            Some(api_key) => sources.push(Box::new(NewsApiSource::new(
                fetcher.clone(),
                config.newsdata_endpoint.clone(),
                api_key.to_string(),
                config.queries.clone(),
            ))),
            None => warn!("No news API key configured; running in RSS-only mode"),
        }

        sources.push(Box::new(RssFeedSource::new(
            fetcher,
            config.feeds,
            config.feed_window_hours,
        )));

        Ok(Self { sources })
    }

    pub fn from_sources(sources: Vec<Box<dyn PullSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.source_name()).collect()
    }

    /// Collect and deduplicate. A rejected credential aborts with no output.
    pub async fn collect(&self, now: DateTime<Utc>) -> std::result::Result<Vec<Article>, AuthError> {
        let mut all_articles = Vec::new();

        for source in &self.sources {
            let report = source.pull(now).await?;
            info!(
                source = %source.source_name(),
                articles = report.articles.len(),
                dropped = report.dropped,
                failed_sources = report.failed_sources,
                rate_limited = report.rate_limited,
                "Source finished"
            );
            all_articles.extend(report.articles);
        }

        let unique = deduplicate(all_articles);
        info!(unique = unique.len(), "Total unique articles after deduplication");
        Ok(unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PullReport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        name: &'static str,
        outcome: std::result::Result<Vec<(&'static str, &'static str)>, AuthError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PullSource for FixedSource {
        fn source_name(&self) -> String {
            self.name.to_string()
        }

        async fn pull(&self, now: DateTime<Utc>) -> std::result::Result<PullReport, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items = self.outcome.clone()?;
            Ok(PullReport {
                articles: items
                    .into_iter()
                    .map(|(title, url)| Article {
                        title: title.to_string(),
                        url: url.to_string(),
                        source: self.name.to_string(),
                        published: now,
                        description: String::new(),
                        content: String::new(),
                    })
                    .collect(),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn api_articles_come_before_feed_articles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = NewsAggregator::from_sources(vec![
            Box::new(FixedSource {
                name: "api",
                outcome: Ok(vec![("api story", "https://x.com/s?utm_campaign=spring")]),
                calls: calls.clone(),
            }),
            Box::new(FixedSource {
                name: "feeds",
                outcome: Ok(vec![("feed copy", "https://x.com/s"), ("feed only", "https://x.com/f")]),
                calls: calls.clone(),
            }),
        ]);

        let articles = aggregator.collect(Utc::now()).await.unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["api story", "feed only"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn auth_error_aborts_before_later_sources() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = NewsAggregator::from_sources(vec![
            Box::new(FixedSource {
                name: "api",
                outcome: Err(AuthError { status: 401 }),
                calls: calls.clone(),
            }),
            Box::new(FixedSource {
                name: "feeds",
                outcome: Ok(vec![("feed", "https://x.com/f")]),
                calls: calls.clone(),
            }),
        ]);

        let err = aggregator.collect(Utc::now()).await.unwrap_err();
        assert_eq!(err.status, 401);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blank_key_means_feed_only() {
        let aggregator =
            NewsAggregator::new(IngestConfig::default().with_api_key(Some("   ".into()))).unwrap();
        assert_eq!(aggregator.source_names(), vec!["RSS feeds".to_string()]);

        let aggregator =
            NewsAggregator::new(IngestConfig::default().with_api_key(Some("key".into()))).unwrap();
        assert_eq!(aggregator.source_names().len(), 2);
    }
}
