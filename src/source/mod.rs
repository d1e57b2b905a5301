//! Metric and notification source collaborator
//!
//! The source is the single resource shared by every worker: it serves the
//! alert definition list, answers metric queries, and accepts notification
//! and resolution dispatches. All calls are stateless request/response and
//! safe for concurrent use.

pub mod http;
#[cfg(test)]
pub mod mock;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::alerts::AlertDefinition;

pub use http::HttpSource;

/// Remote metric/notification backend shared by all workers
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Fetch the full alert definition list
    async fn list_alerts(&self) -> Result<Vec<AlertDefinition>, SourceError>;

    /// Evaluate a query expression to a single numeric value
    async fn query(&self, query: &str) -> Result<f64, SourceError>;

    /// Dispatch a notification for a failing alert
    async fn notify(&self, name: &str, state: &str) -> Result<(), SourceError>;

    /// Dispatch a resolution signal for a recovered alert
    async fn resolve(&self, name: &str) -> Result<(), SourceError>;
}

/// Source call failures; all variants are retryable
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Attempts for per-alert dispatch calls (query, notify, resolve)
pub const DISPATCH_ATTEMPTS: u32 = 3;

/// Pause between failed dispatch attempts
pub const DISPATCH_BACKOFF: Duration = Duration::from_millis(250);

/// Run `op` up to [`DISPATCH_ATTEMPTS`] times, logging and backing off
/// between failures. Returns the final error once every attempt has failed.
pub async fn retrying<T, F, Fut>(desc: &str, mut op: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < DISPATCH_ATTEMPTS => {
                tracing::warn!(call = %desc, attempt, error = %e, "Source call failed, backing off");
                tokio::time::sleep(DISPATCH_BACKOFF).await;
            }
            Err(e) => return Err(e),
        }
    }
}
