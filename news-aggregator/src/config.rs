use crate::types::IngestConfig;
use clap::Parser;
use email_delivery::{Envelope, SmtpConfig};
use std::path::PathBuf;

pub const SENDER_NAME: &str = "FastTrackr AI";

#[derive(Parser, Debug, Clone)]
#[command(name = "ria-digest", about = "Daily RIA news digest")]
pub struct Cli {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "GMAIL_USER")]
    pub gmail_user: Option<String>,

    #[arg(long, env = "GMAIL_APP_PASSWORD", hide_env_values = true)]
    pub gmail_app_password: Option<String>,

    /// Comma-separated list of addresses.
    #[arg(long, env = "EMAIL_RECIPIENTS")]
    pub email_recipients: Option<String>,

    /// Leave unset to run on RSS feeds alone.
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    pub newsdata_api_key: Option<String>,

    /// Write the rendered HTML here instead of sending it.
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("EMAIL_RECIPIENTS contains no addresses")]
    NoRecipients,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub smtp: SmtpConfig,
    pub envelope: Envelope,
    pub ingest: IngestConfig,
    pub preview: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |value: Option<String>, name: &'static str| match value {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let openai_api_key = required(cli.openai_api_key, "OPENAI_API_KEY");
        let gmail_user = required(cli.gmail_user, "GMAIL_USER");
        let gmail_app_password = required(cli.gmail_app_password, "GMAIL_APP_PASSWORD");
        let email_recipients = required(cli.email_recipients, "EMAIL_RECIPIENTS");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let recipients = parse_recipients(&email_recipients);
        if recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        Ok(Self {
            openai_api_key,
            smtp: SmtpConfig::gmail(gmail_user.clone(), gmail_app_password),
            envelope: Envelope {
                sender_name: SENDER_NAME.to_string(),
                sender_address: gmail_user,
                recipients,
            },
            ingest: IngestConfig::default().with_api_key(cli.newsdata_api_key),
            preview: cli.preview,
        })
    }
}

pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}
