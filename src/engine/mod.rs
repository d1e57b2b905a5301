//! Sharded evaluate→notify→resolve pipeline
//!
//! The working set is fetched once at startup, partitioned across isolated
//! shards, and each shard gets three workers cycling records between its
//! poll, notify, and resolve queues. Shards share nothing but the source
//! client, so one slow or failing check cannot starve the others.

pub mod notify;
pub mod poll;
pub mod resolve;
pub mod shard;
pub mod ticker;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;

use crate::alerts::{config::validate_definitions, AlertDefinition, AlertRecord};
use crate::config::EngineConfig;
use crate::source::AlertSource;

pub use notify::NotifyWorker;
pub use poll::PollWorker;
pub use resolve::ResolveWorker;
pub use shard::{partition, AlertQueue, Shard};
pub use ticker::Ticker;

/// Backoff between attempts to fetch the initial alert list
const FETCH_RETRY_BACKOFF: Duration = Duration::from_secs(30);

/// Shard count actually used: the configured concurrency bounded by the
/// working set size, never below one
fn effective_shards(concurrency: usize, alert_count: usize) -> usize {
    concurrency.clamp(1, alert_count)
}

/// Owns the working set lifecycle: fetch, partition, spawn workers, shut down
pub struct Engine {
    source: Arc<dyn AlertSource>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(source: Arc<dyn AlertSource>, config: EngineConfig) -> Self {
        Self { source, config }
    }

    /// Fetch the alert working set, retrying until the source yields a
    /// non-empty valid list. The engine is purposeless without one, so this
    /// is the single unbounded-retry point in the process.
    pub async fn fetch_definitions(&self) -> Vec<AlertDefinition> {
        loop {
            match self.source.list_alerts().await {
                Ok(definitions) => {
                    let valid = validate_definitions(definitions);
                    if !valid.is_empty() {
                        return valid;
                    }
                    tracing::error!(
                        "Alert list is empty, retrying in {}s",
                        FETCH_RETRY_BACKOFF.as_secs()
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Could not contact metric source, retrying in {}s",
                        FETCH_RETRY_BACKOFF.as_secs()
                    );
                }
            }
            tokio::time::sleep(FETCH_RETRY_BACKOFF).await;
        }
    }

    /// Run the pipeline until interrupted, then stop all workers gracefully
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let definitions = self.fetch_definitions().await;
        tracing::info!("There are {} total alerts being watched", definitions.len());

        let shard_count = effective_shards(self.config.concurrency, definitions.len());
        let interval = Duration::from_secs(self.config.interval_secs);

        tracing::info!(
            "Running alert-exec with {} shards on a {}s timer",
            shard_count,
            self.config.interval_secs
        );
        tracing::info!("Press Ctrl-C to exit");

        let records: Vec<AlertRecord> = definitions.into_iter().map(AlertRecord::new).collect();
        let shards = partition(records, shard_count);

        let (stop_tx, stop_rx) = watch::channel(false);
        let mut handles = Vec::with_capacity(shards.len() * 3);
        for shard in &shards {
            handles.push(
                PollWorker::new(Arc::clone(shard), Arc::clone(&self.source), interval)
                    .start(stop_rx.clone()),
            );
            handles.push(
                NotifyWorker::new(Arc::clone(shard), Arc::clone(&self.source), interval)
                    .start(stop_rx.clone()),
            );
            handles.push(
                ResolveWorker::new(Arc::clone(shard), Arc::clone(&self.source), interval)
                    .start(stop_rx.clone()),
            );
        }
        drop(stop_rx);

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown signal received, stopping workers...");

        // workers finish their current pass before observing the signal
        let _ = stop_tx.send(true);
        join_all(handles).await;

        tracing::info!("Alert engine stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{test_definition, AlertState};
    use crate::source::mock::MockSource;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_effective_shards_clamps_both_ends() {
        assert_eq!(effective_shards(0, 10), 1);
        assert_eq!(effective_shards(4, 10), 4);
        assert_eq!(effective_shards(16, 10), 10);
        assert_eq!(effective_shards(1, 1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_until_source_is_reachable() {
        let source = Arc::new(MockSource::new());
        source.fail_list_times(2);
        source.set_definitions(vec![test_definition("cpu", 10.0, 20.0)]);

        let engine = Engine::new(
            Arc::clone(&source) as Arc<dyn AlertSource>,
            EngineConfig::default(),
        );
        let definitions = engine.fetch_definitions().await;

        assert_eq!(definitions.len(), 1);
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_while_list_is_empty() {
        let source = Arc::new(MockSource::new());
        let engine = Engine::new(
            Arc::clone(&source) as Arc<dyn AlertSource>,
            EngineConfig::default(),
        );

        let fetcher = tokio::spawn(async move { engine.fetch_definitions().await });

        // let the first attempt observe the empty list and start its backoff
        tokio::time::sleep(Duration::from_millis(1)).await;
        source.set_definitions(vec![test_definition("cpu", 10.0, 20.0)]);

        let definitions = fetcher.await.unwrap();
        assert_eq!(definitions.len(), 1);
        assert!(source.list_calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_rejects_invalid_definitions() {
        let source = Arc::new(MockSource::new());
        let bad = test_definition("bad", 20.0, 10.0);
        source.set_definitions(vec![test_definition("good", 10.0, 20.0), bad]);

        let engine = Engine::new(
            Arc::clone(&source) as Arc<dyn AlertSource>,
            EngineConfig::default(),
        );
        let definitions = engine.fetch_definitions().await;

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "good");
    }

    /// PASS → WARN → PASS through all three workers on one shard
    #[tokio::test(start_paused = true)]
    async fn test_full_round_trip() {
        let shard = Arc::new(Shard::new(0));
        let source = Arc::new(MockSource::new());
        let dyn_source = Arc::clone(&source) as Arc<dyn AlertSource>;
        let interval = Duration::from_secs(1);

        let poll = PollWorker::new(Arc::clone(&shard), Arc::clone(&dyn_source), interval);
        let notify = NotifyWorker::new(Arc::clone(&shard), Arc::clone(&dyn_source), interval);
        let resolve = ResolveWorker::new(Arc::clone(&shard), Arc::clone(&dyn_source), interval);

        source.script("avg(cpu)", vec![Some(15.0), Some(5.0)]);
        shard.poll.push(AlertRecord::new(test_definition("cpu", 10.0, 20.0)));

        // tick 1: breach routes to notify, which dispatches and requeues
        poll.run_pass().await;
        notify.run_pass().await;
        assert_eq!(
            source.notifications(),
            vec![("cpu".to_string(), "WARNING".to_string())]
        );

        // tick 2: recovery routes to resolve, which dispatches and requeues
        poll.run_pass().await;
        resolve.run_pass().await;
        assert_eq!(source.resolutions(), vec!["cpu".to_string()]);

        let record = shard.poll.pop().unwrap();
        assert_eq!(record.state, AlertState::Pass);
        assert!(record.triggered_at.is_none());
        assert_eq!(shard.record_count(), 0);
    }
}
