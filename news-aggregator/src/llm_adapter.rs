use crate::dedup::canonicalize_url;
use crate::normalize::{parse_timestamp, truncate_chars, DESCRIPTION_LIMIT};
use crate::types::{Article, CategorizedDigest, Category, EnrichedArticle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const BATCH_SIZE: usize = 20;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECONDS: u64 = 120;

pub const SYSTEM_PROMPT: &str = r#"You are the editorial assistant for FastTrackr AI, a platform serving independent RIA firms and breakaway advisors.

Your job is to review news articles and:
1. FILTER: Keep only articles relevant to the US wealth management / RIA industry. Discard anything unrelated (e.g., general stock holdings announcements, unrelated M&A, international stories with no US wealth management angle).
2. CATEGORIZE: Assign each kept article to exactly one of these categories:
   - acquisitions_ma: RIA firm acquisitions, mergers, consolidations, or firm sales. Also includes PE-backed aggregator deals.
   - breakaway_advisors: Any advisor or team movement story: advisors leaving wirehouses/broker-dealers to go independent, wirehouse-to-wirehouse team moves, team recruiting announcements, and wirehouse retention/recruiting loan programs.
   - funding_investment: VC/PE funding rounds, growth capital raises, or strategic investment in wealth management or wealthtech firms.
   - ai_wealthtech: AI or technology news with a US wealth management angle: AI tools or platforms for financial advisors, wealthtech product launches, AI regulation or SEC guidance on AI in advice, research on AI adoption in the advisory industry. Broad AI news only if the article discusses implications for US wealth management or financial advisors.
3. SUMMARIZE: Write a 2-3 sentence summary in active voice. End with why it matters for independent advisors or how it shifts the competitive landscape.

Return a JSON object with this exact structure:
{
  "articles": [
    {
      "title": "original article title",
      "url": "original article url",
      "source": "original source name",
      "published": "original published date",
      "category": "acquisitions_ma|breakaway_advisors|funding_investment|ai_wealthtech",
      "summary": "2-3 sentence summary ending with why it matters for independent advisors."
    }
  ]
}

Only include articles that are relevant. If none are relevant, return {"articles": []}.
Do not invent, hallucinate, or modify titles, URLs, sources, or dates."#;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no message content")]
    EmptyResponse,
}

/// Trait for language-model backends that filter, categorize and summarize a batch.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Get the name of this LLM adapter
    fn adapter_name(&self) -> String;

    /// Send one batch and return the model's raw JSON reply.
    async fn complete_batch(&self, articles: &[Article]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI chat-completions backend.
pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_base: OPENAI_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl LlmAdapter for OpenAiAdapter {
    fn adapter_name(&self) -> String {
        format!("OpenAI ({})", self.model)
    }

    async fn complete_batch(&self, articles: &[Article]) -> Result<String, LlmError> {
        let user_prompt = build_user_prompt(articles);
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            max_tokens: 4000,
            response_format: ResponseFormat { kind: "json_object" },
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, 500),
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Numbered article listing sent as the user message.
pub fn build_user_prompt(articles: &[Article]) -> String {
    let mut lines = vec!["Review the following articles and process them per your instructions:\n".to_string()];
    for (i, a) in articles.iter().enumerate() {
        lines.push(format!("{}. TITLE: {}", i + 1, a.title));
        lines.push(format!("   SOURCE: {}", a.source));
        lines.push(format!("   DATE: {}", a.published.to_rfc3339()));
        lines.push(format!("   URL: {}", a.url));
        if !a.description.is_empty() {
            lines.push(format!(
                "   DESCRIPTION: {}",
                truncate_chars(&a.description, DESCRIPTION_LIMIT)
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[derive(Debug, Deserialize)]
struct ModelReply {
    #[serde(default)]
    articles: Vec<ModelArticle>,
}

#[derive(Debug, Deserialize)]
struct ModelArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<String>,
    published: Option<String>,
    category: Option<String>,
    summary: Option<String>,
}

/// Parse one model reply. Items without title/url or with a category outside
/// [`Category`] are dropped. Items are re-attached to the ingested article with
/// the same canonical URL when there is one.
pub fn parse_model_response(
    raw: &str,
    originals: &HashMap<String, &Article>,
    now: DateTime<Utc>,
) -> Vec<EnrichedArticle> {
    let reply: ModelReply = match serde_json::from_str(raw) {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, raw = %truncate_chars(raw, 500), "Model returned invalid JSON");
            return Vec::new();
        }
    };

    let mut results = Vec::new();
    for item in reply.articles {
        let title = item.title.unwrap_or_default();
        let url = item.url.unwrap_or_default();
        if title.trim().is_empty() || url.trim().is_empty() {
            continue;
        }

        let raw_category = item.category.unwrap_or_default();
        let Some(category) = Category::from_key(&raw_category) else {
            warn!(
                category = %raw_category,
                title = %truncate_chars(&title, 60),
                "Filtered out article with invalid category"
            );
            continue;
        };

        let article = match originals.get(&canonicalize_url(&url)) {
            Some(original) => (*original).clone(),
            None => {
                debug!(url = %url, "Model returned a URL not in the batch; using its fields");
                Article {
                    title: title.trim().to_string(),
                    url: url.trim().to_string(),
                    source: item.source.unwrap_or_default(),
                    published: item
                        .published
                        .as_deref()
                        .and_then(parse_timestamp)
                        .unwrap_or(now),
                    description: String::new(),
                    content: String::new(),
                }
            }
        };

        results.push(EnrichedArticle {
            article,
            category,
            summary: item.summary.unwrap_or_default().trim().to_string(),
        });
    }
    results
}

/// Filter, categorize and summarize in batches of [`BATCH_SIZE`].
///
/// A failed batch contributes nothing; this never fails the run.
pub async fn summarize_and_categorize(
    adapter: &dyn LlmAdapter,
    articles: &[Article],
    now: DateTime<Utc>,
) -> CategorizedDigest {
    let mut digest = CategorizedDigest::new();
    if articles.is_empty() {
        info!("No articles to summarize; skipping model call");
        return digest;
    }

    let mut originals: HashMap<String, &Article> = HashMap::new();
    for article in articles {
        originals.entry(canonicalize_url(&article.url)).or_insert(article);
    }

    for (i, batch) in articles.chunks(BATCH_SIZE).enumerate() {
        info!(
            adapter = %adapter.adapter_name(),
            batch = i + 1,
            size = batch.len(),
            "Sending batch to language model"
        );
        match adapter.complete_batch(batch).await {
            Ok(raw) => {
                for enriched in parse_model_response(&raw, &originals, now) {
                    digest.push(enriched);
                }
            }
            Err(e) => error!(batch = i + 1, error = %e, "Language model call failed"),
        }
    }

    info!(
        total = digest.total(),
        acquisitions_ma = digest.articles(Category::AcquisitionsMa).len(),
        breakaway_advisors = digest.articles(Category::BreakawayAdvisors).len(),
        funding_investment = digest.articles(Category::FundingInvestment).len(),
        ai_wealthtech = digest.articles(Category::AiWealthtech).len(),
        "Model output grouped"
    );
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn article(n: usize) -> Article {
        Article {
            title: format!("Story {}", n),
            url: format!("https://example.com/{}", n),
            source: "RIABiz".to_string(),
            published: Utc.with_ymd_and_hms(2026, 2, 22, 8, 0, 0).unwrap(),
            description: format!("Description {}", n),
            content: String::new(),
        }
    }

    fn index(articles: &[Article]) -> HashMap<String, &Article> {
        articles.iter().map(|a| (canonicalize_url(&a.url), a)).collect()
    }

    /// Keeps every article it is sent, all in one category, and records batch sizes.
    struct ScriptedAdapter {
        batches: Mutex<Vec<usize>>,
        fail_batch: Option<usize>,
    }

    #[async_trait]
    impl LlmAdapter for ScriptedAdapter {
        fn adapter_name(&self) -> String {
            "scripted".to_string()
        }

        async fn complete_batch(&self, articles: &[Article]) -> Result<String, LlmError> {
            let mut batches = self.batches.lock().unwrap();
            batches.push(articles.len());
            if self.fail_batch == Some(batches.len()) {
                return Err(LlmError::EmptyResponse);
            }
            let items: Vec<serde_json::Value> = articles
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "title": a.title,
                        "url": a.url,
                        "source": a.source,
                        "published": a.published.to_rfc3339(),
                        "category": "ai_wealthtech",
                        "summary": "Why it matters.",
                    })
                })
                .collect();
            Ok(serde_json::json!({ "articles": items }).to_string())
        }
    }

    #[test]
    fn prompt_lists_articles_with_numbering() {
        let prompt = build_user_prompt(&[article(1), article(2)]);
        assert!(prompt.contains("1. TITLE: Story 1"));
        assert!(prompt.contains("2. TITLE: Story 2"));
        assert!(prompt.contains("   URL: https://example.com/2"));
        assert!(prompt.contains("   DESCRIPTION: Description 1"));
    }

    #[test]
    fn discards_unknown_categories_and_missing_fields() {
        let articles = vec![article(1), article(2)];
        let raw = r#"{"articles": [
            {"title": "Story 1", "url": "https://example.com/1", "category": "acquisitions_ma", "summary": " Deal. "},
            {"title": "Story 2", "url": "https://example.com/2", "category": "sports", "summary": "x"},
            {"title": "", "url": "https://example.com/3", "category": "ai_wealthtech"},
            {"url": "https://example.com/4", "category": "ai_wealthtech"}
        ]}"#;
        let parsed = parse_model_response(raw, &index(&articles), Utc::now());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].category, Category::AcquisitionsMa);
        assert_eq!(parsed[0].summary, "Deal.");
        assert_eq!(parsed[0].article, articles[0]);
    }

    #[test]
    fn unmatched_urls_fall_back_to_model_fields() {
        let now = Utc.with_ymd_and_hms(2026, 2, 23, 12, 0, 0).unwrap();
        let raw = r#"{"articles": [
            {"title": "Other", "url": "https://other.com/x", "source": "Wire", "published": "not a date", "category": "funding_investment", "summary": "s"}
        ]}"#;
        let parsed = parse_model_response(raw, &HashMap::new(), now);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].article.source, "Wire");
        assert_eq!(parsed[0].article.published, now);
    }

    #[test]
    fn tracking_params_in_model_url_still_match() {
        let articles = vec![article(7)];
        let raw = r#"{"articles": [{"title": "Story 7", "url": "https://example.com/7?utm_source=gpt", "category": "breakaway_advisors", "summary": "s"}]}"#;
        let parsed = parse_model_response(raw, &index(&articles), Utc::now());
        assert_eq!(parsed[0].article.url, "https://example.com/7");
    }

    #[test]
    fn invalid_json_yields_nothing() {
        assert!(parse_model_response("not json", &HashMap::new(), Utc::now()).is_empty());
        assert!(parse_model_response("{}", &HashMap::new(), Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn batches_of_twenty() {
        let articles: Vec<Article> = (0..45).map(article).collect();
        let adapter = ScriptedAdapter { batches: Mutex::new(Vec::new()), fail_batch: None };
        let digest = summarize_and_categorize(&adapter, &articles, Utc::now()).await;
        assert_eq!(*adapter.batches.lock().unwrap(), vec![20, 20, 5]);
        assert_eq!(digest.total(), 45);
        assert_eq!(digest.articles(Category::AiWealthtech).len(), 45);
    }

    #[tokio::test]
    async fn failed_batch_degrades_to_missing_articles() {
        let articles: Vec<Article> = (0..25).map(article).collect();
        let adapter = ScriptedAdapter { batches: Mutex::new(Vec::new()), fail_batch: Some(1) };
        let digest = summarize_and_categorize(&adapter, &articles, Utc::now()).await;
        assert_eq!(digest.total(), 5);
    }

    #[tokio::test]
    async fn no_articles_means_no_call() {
        let adapter = ScriptedAdapter { batches: Mutex::new(Vec::new()), fail_batch: None };
        let digest = summarize_and_categorize(&adapter, &[], Utc::now()).await;
        assert!(digest.is_empty());
        assert!(adapter.batches.lock().unwrap().is_empty());
    }
}
