use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use email_delivery::SmtpMailer;
use news_aggregator::{AppConfig, Cli, Delivery, DigestPipeline, NewsAggregator, OpenAiAdapter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_cli(Cli::parse())?;
    info!("Starting RIA news digest");

    let aggregator = NewsAggregator::new(config.ingest).context("failed to build HTTP client")?;
    let llm = OpenAiAdapter::new(config.openai_api_key).context("failed to build model client")?;

    let delivery = match config.preview {
        Some(path) => Delivery::Preview(path),
        None => Delivery::Send {
            mailer: Box::new(SmtpMailer::new(&config.smtp)?),
            envelope: config.envelope,
        },
    };

    let pipeline = DigestPipeline::new(aggregator, Box::new(llm), delivery);
    pipeline.run(Utc::now()).await?;
    Ok(())
}
