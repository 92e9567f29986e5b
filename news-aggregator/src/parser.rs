use crate::types::{Result, SourceError};
use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use tracing::debug;

/// The fields of a feed entry the digest cares about, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parse an RSS or Atom document.
pub fn parse_feed(content: &[u8]) -> Result<Vec<ParsedEntry>> {
    debug!("Parsing feed content ({} bytes)", content.len());

    let feed = parser::parse(content)
        .map_err(|e| SourceError::Parse(format!("Failed to parse feed: {}", e)))?;

    Ok(feed.entries.into_iter().map(parse_entry).collect())
}

fn parse_entry(entry: Entry) -> ParsedEntry {
    let title = entry.title.map(|t| t.content);

    // Atom entries may carry several links; prefer the alternate one.
    let url = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone());

    let description = entry.summary.map(|s| s.content);
    let content = entry.content.and_then(|c| c.body);

    ParsedEntry {
        title,
        url,
        description,
        content,
        published_at: entry.published,
        updated_at: entry.updated,
    }
}
