//! Pure conversions from source records into [`Article`]s.

use crate::types::Article;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use scraper::Html;

pub const DESCRIPTION_LIMIT: usize = 300;
pub const CONTENT_LIMIT: usize = 1000;
pub const TRUNCATION_MARKER: char = '…';

/// A source record before normalization. Fields are whatever the source gave us.
#[derive(Debug, Clone, Default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub published: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub content: Option<String>,
}

/// Build an [`Article`], or `None` when title or url is blank after trimming.
pub fn normalize_article(raw: RawArticle, now: DateTime<Utc>) -> Option<Article> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    let url = raw.url.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() || url.is_empty() {
        return None;
    }

    let description = raw
        .description
        .as_deref()
        .map(|d| truncate_with_marker(&html_to_text(d), DESCRIPTION_LIMIT))
        .unwrap_or_default();
    let content = raw
        .content
        .as_deref()
        .map(|c| truncate_chars(&html_to_text(c), CONTENT_LIMIT))
        .unwrap_or_default();

    Some(Article {
        title: title.to_string(),
        url: url.to_string(),
        source: raw.source,
        published: raw.published.unwrap_or(now),
        description,
        content,
    })
}

/// Strip markup and decode entities, collapsing runs of whitespace.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim, then cut to `max_chars` characters and append [`TRUNCATION_MARKER`] if anything was cut.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}

/// Cut to at most `max_chars` characters, no marker.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Publish timestamp fallback chain: published, then updated, then `now`.
pub fn resolve_published(
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    published.or(updated).unwrap_or(now)
}

/// Parse the timestamp formats the news API and feeds use in practice.
/// Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// True when `published` is no more than `hours` before `now`.
pub fn within_window(published: DateTime<Utc>, now: DateTime<Utc>, hours: i64) -> bool {
    now.signed_duration_since(published) <= Duration::hours(hours)
}
