use crate::types::{AuthError, PullReport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A class of external article source (news API, RSS feeds, ...).
///
/// Per-query and per-feed failures are absorbed inside `pull` and show up
/// only as counts in the [`PullReport`]. The one error that escapes is a
/// rejected credential, which no later request could recover from.
#[async_trait]
pub trait PullSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch and normalize everything this source has for the run at `now`.
    async fn pull(&self, now: DateTime<Utc>) -> Result<PullReport, AuthError>;
}
