#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use news_aggregator::{FeedSource, FetchConfig, IngestConfig, QuerySpec, FEED_WINDOW_HOURS};
use serde_json::{json, Value};
use std::sync::Once;
use wiremock::MockServer;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const API_PATH: &str = "/api/1/latest";
pub const API_KEY: &str = "test-key";
pub const ACQUISITION_QUERY: &str = "\"wealth management\" acquisition";
pub const FUNDING_QUERY: &str = "wealth management funding advisor";

/// Tuesday, 10 June 2025, noon UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
}

pub fn feed_path(i: usize) -> String {
    format!("/feed/{}", i)
}

pub fn ingest_config(server: &MockServer, api_key: Option<&str>) -> IngestConfig {
    IngestConfig {
        newsdata_endpoint: format!("{}{}", server.uri(), API_PATH),
        newsdata_api_key: api_key.map(String::from),
        queries: vec![
            QuerySpec::new(ACQUISITION_QUERY, "en"),
            QuerySpec::new(FUNDING_QUERY, "en"),
        ],
        feeds: (1..=4)
            .map(|i| FeedSource::new(&format!("Feed {}", i), &format!("{}{}", server.uri(), feed_path(i))))
            .collect(),
        fetch: FetchConfig::default(),
        feed_window_hours: FEED_WINDOW_HOURS,
    }
}

pub fn news_item(title: &str, link: &str) -> Value {
    json!({
        "title": title,
        "link": link,
        "source_id": "investmentnews",
        "pubDate": "2025-06-10 09:00:00",
        "description": "<p>Deal &amp; details</p>",
        "content": null
    })
}

pub fn news_response(items: Vec<Value>) -> Value {
    json!({
        "status": "success",
        "totalResults": items.len(),
        "results": items
    })
}

/// RSS 2.0 document; each item is `(title, link, pubDate)`. An empty
/// `pubDate` leaves the element out.
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, date)| {
            let pub_date = if date.is_empty() {
                String::new()
            } else {
                format!("<pubDate>{}</pubDate>", date)
            };
            format!(
                "<item><title>{}</title><link>{}</link>{}\
                 <description>&lt;p&gt;{} summary&lt;/p&gt;</description></item>",
                title, link, pub_date, title
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Test feed</title>\
         <link>https://feed.example.com</link><description>Test</description>{}</channel></rss>",
        body
    )
}

pub const FRESH: &str = "Tue, 10 Jun 2025 08:00:00 GMT";
pub const STALE: &str = "Mon, 02 Jun 2025 08:00:00 GMT";
pub const UNDATED: &str = "";
