use crate::types::Article;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

pub const TRACKING_PARAM_PREFIX: &str = "utm_";

/// Remove `utm_*` query parameters. Scheme, host, path, fragment and the
/// remaining parameters are kept; the query is always re-encoded so that
/// `%20`/`+` and similar spellings agree. Strings that don't parse as URLs
/// are only trimmed.
pub fn canonicalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !k.starts_with(TRACKING_PARAM_PREFIX))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url.to_string()
}

/// Keep the first article per canonical URL, preserving first-seen order.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(before);

    for article in articles {
        let key = canonicalize_url(&article.url);
        if key.is_empty() {
            continue;
        }
        if seen.insert(key) {
            unique.push(article);
        } else {
            debug!(title = %article.title, url = %article.url, "Removing duplicate article");
        }
    }

    let removed = before - unique.len();
    if removed > 0 {
        info!(removed, "Removed duplicate articles");
    }
    unique
}
