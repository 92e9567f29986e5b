use crate::aggregator::NewsAggregator;
use crate::llm_adapter::{summarize_and_categorize, LlmAdapter};
use crate::types::AuthError;
use chrono::{DateTime, Utc};
use email_delivery::{build_message, digest_subject, render_email_html, DeliveryError, Envelope, Mailer};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("ingestion aborted: {0}")]
    Ingest(#[from] AuthError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("failed to write preview to {path}: {source}")]
    Preview {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the rendered digest ends up.
pub enum Delivery {
    Send {
        mailer: Box<dyn Mailer>,
        envelope: Envelope,
    },
    Preview(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub relevant: usize,
    pub delivered: bool,
}

/// One daily run: ingest, summarize, render, deliver.
pub struct DigestPipeline {
    aggregator: NewsAggregator,
    llm: Box<dyn LlmAdapter>,
    delivery: Delivery,
}

impl DigestPipeline {
    pub fn new(aggregator: NewsAggregator, llm: Box<dyn LlmAdapter>, delivery: Delivery) -> Self {
        Self {
            aggregator,
            llm,
            delivery,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, PipelineError> {
        info!(sources = ?self.aggregator.source_names(), "Starting digest run");

        let articles = self.aggregator.collect(now).await?;
        let digest = summarize_and_categorize(self.llm.as_ref(), &articles, now).await;

        let has_news = !digest.is_empty();
        if !has_news {
            warn!(fetched = articles.len(), "No relevant news today; sending the empty digest");
        }

        let subject = digest_subject(has_news, now);
        let html = render_email_html(&digest, now);

        let delivered = match &self.delivery {
            Delivery::Send { mailer, envelope } => {
                let message = build_message(envelope, &subject, &html)?;
                mailer.deliver(message).await?;
                true
            }
            Delivery::Preview(path) => {
                tokio::fs::write(path, &html)
                    .await
                    .map_err(|source| PipelineError::Preview {
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), "Preview written; email not sent");
                false
            }
        };

        let summary = RunSummary {
            fetched: articles.len(),
            relevant: digest.total(),
            delivered,
        };
        info!(
            fetched = summary.fetched,
            relevant = summary.relevant,
            delivered = summary.delivered,
            "Digest run complete"
        );
        Ok(summary)
    }
}
