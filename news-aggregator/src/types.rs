pub use interfaces::defs::{Article, CategorizedDigest, Category, EnrichedArticle};

pub const NEWSDATA_ENDPOINT: &str = "https://newsdata.io/api/1/latest";

/// Lookback for feed entries. Wide enough to bridge a weekend between runs;
/// the resulting overlap is absorbed by dedup and the relevance filter.
pub const FEED_WINDOW_HOURS: i64 = 72;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "FastTrackr-RIA-Digest/1.0".to_string(),
            timeout_seconds: 15,
        }
    }
}

/// One search against the news API.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub q: String,
    pub language: String,
    pub country: Option<String>,
}

impl QuerySpec {
    pub fn new(q: &str, language: &str) -> Self {
        Self {
            q: q.to_string(),
            language: language.to_string(),
            country: None,
        }
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone()), ("language", self.language.clone())];
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        params
    }

    /// Shortened query text for log lines.
    pub fn label(&self) -> String {
        self.q.chars().take(60).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Static source configuration handed to the aggregator.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub newsdata_endpoint: String,
    /// `None` or blank means feed-only mode.
    pub newsdata_api_key: Option<String>,
    pub queries: Vec<QuerySpec>,
    pub feeds: Vec<FeedSource>,
    pub fetch: FetchConfig,
    pub feed_window_hours: i64,
}

impl IngestConfig {
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.newsdata_api_key = api_key;
        self
    }

    /// The credential, if one was supplied and is not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.newsdata_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            newsdata_endpoint: NEWSDATA_ENDPOINT.to_string(),
            newsdata_api_key: None,
            // Only the AI query is pinned to the US; niche M&A and breakaway
            // stories often sit on sites that don't register as country=us.
            queries: vec![
                QuerySpec::new("\"wealth management\" acquisition", "en"),
                QuerySpec::new("wealth management funding advisor", "en"),
                QuerySpec::new("AI wealthtech wealth management", "en").with_country("us"),
            ],
            feeds: vec![
                FeedSource::new("AdvisorHub", "https://advisorhub.com/feed/"),
                FeedSource::new("RIABiz", "https://riabiz.com/rss"),
                FeedSource::new("WealthManagement.com", "https://www.wealthmanagement.com/rss.xml"),
                FeedSource::new("Financial Planning", "https://www.financial-planning.com/feed/"),
            ],
            fetch: FetchConfig::default(),
            feed_window_hours: FEED_WINDOW_HOURS,
        }
    }
}

/// The search API rejected the credential. Fatal for the whole ingestion stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("news API rejected the credential (HTTP {status}); check NEWSDATA_API_KEY")]
pub struct AuthError {
    pub status: u16,
}

/// Failure of a single query or feed. Everything except `Auth` is absorbed
/// at the adapter by skipping that source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Per-adapter tallies for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullReport {
    pub articles: Vec<Article>,
    /// Records dropped for missing title or url.
    pub dropped: usize,
    /// Queries or feeds skipped after a failure.
    pub failed_sources: usize,
    /// Set when the source asked us to stop calling it for this run.
    pub rate_limited: bool,
}

impl PullReport {
    pub fn absorb(&mut self, other: PullReport) {
        self.articles.extend(other.articles);
        self.dropped += other.dropped;
        self.failed_sources += other.failed_sources;
        self.rate_limited |= other.rate_limited;
    }
}
