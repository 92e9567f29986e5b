use crate::fetcher::Fetcher;
use crate::normalize::{normalize_article, resolve_published, within_window, RawArticle};
use crate::parser::{parse_feed, ParsedEntry};
use crate::traits::PullSource;
use crate::types::{AuthError, FeedSource, PullReport, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Polls a fixed list of RSS/Atom feeds and keeps entries inside the recency window.
pub struct RssFeedSource {
    fetcher: Arc<Fetcher>,
    feeds: Vec<FeedSource>,
    window_hours: i64,
}

impl RssFeedSource {
    pub fn new(fetcher: Arc<Fetcher>, feeds: Vec<FeedSource>, window_hours: i64) -> Self {
        Self {
            fetcher,
            feeds,
            window_hours,
        }
    }

    async fn pull_feed(&self, feed: &FeedSource, now: DateTime<Utc>) -> Result<PullReport> {
        let content = self.fetcher.fetch_feed(feed).await?;
        let entries = parse_feed(&content)?;

        let mut report = PullReport::default();
        let mut stale = 0usize;
        for entry in entries {
            let published = resolve_published(entry.published_at, entry.updated_at, now);
            if !within_window(published, now, self.window_hours) {
                stale += 1;
                continue;
            }
            match normalize_article(entry_to_raw(entry, &feed.name, published), now) {
                Some(article) => report.articles.push(article),
                None => report.dropped += 1,
            }
        }

        debug!(source = %feed.name, stale, dropped = report.dropped, "Filtered feed entries");
        Ok(report)
    }
}

fn entry_to_raw(entry: ParsedEntry, source: &str, published: DateTime<Utc>) -> RawArticle {
    RawArticle {
        title: entry.title,
        url: entry.url,
        source: source.to_string(),
        published: Some(published),
        description: entry.description,
        content: entry.content,
    }
}

#[async_trait]
impl PullSource for RssFeedSource {
    fn source_name(&self) -> String {
        "RSS feeds".to_string()
    }

    async fn pull(&self, now: DateTime<Utc>) -> std::result::Result<PullReport, AuthError> {
        let mut report = PullReport::default();

        for feed in &self.feeds {
            match self.pull_feed(feed, now).await {
                Ok(partial) => {
                    info!(
                        source = %feed.name,
                        articles = partial.articles.len(),
                        window_hours = self.window_hours,
                        "RSS feed: articles within window"
                    );
                    report.absorb(partial);
                }
                Err(e) => {
                    warn!(source = %feed.name, error = %e, "RSS feed failed; skipping");
                    report.failed_sources += 1;
                }
            }
        }

        Ok(report)
    }
}
