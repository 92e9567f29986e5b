pub mod types;
pub mod normalize;
pub mod dedup;
pub mod fetcher;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod aggregator;
pub mod llm_adapter;
pub mod pipeline;
pub mod config;

pub use types::*;
pub use fetcher::Fetcher;
pub use traits::PullSource;
pub use aggregator::NewsAggregator;
pub use llm_adapter::{summarize_and_categorize, LlmAdapter, LlmError, OpenAiAdapter};
pub use pipeline::{Delivery, DigestPipeline, PipelineError, RunSummary};
pub use config::{AppConfig, Cli, ConfigError};
