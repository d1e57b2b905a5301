//! Resolve worker: one-shot resolution dispatch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::shard::Shard;
use super::ticker::Ticker;
use crate::alerts::AlertRecord;
use crate::source::{retrying, AlertSource};

/// Worker 3/3: once per tick, sends a resolution signal for every record in
/// the resolve queue. Success or final failure, the record returns to the
/// poll queue; resolution is best-effort but monitoring never stops.
pub struct ResolveWorker {
    shard: Arc<Shard>,
    source: Arc<dyn AlertSource>,
    interval: Duration,
}

impl ResolveWorker {
    pub fn new(shard: Arc<Shard>, source: Arc<dyn AlertSource>, interval: Duration) -> Self {
        Self {
            shard,
            source,
            interval,
        }
    }

    /// Run the worker loop until the stop signal flips
    pub fn start(self, mut stop: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = Ticker::new(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_pass().await,
                    _ = stop.changed() => {
                        tracing::debug!(shard = self.shard.index, "Resolve worker stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Process everything currently in the resolve queue exactly once
    pub async fn run_pass(&self) {
        let batch = self.shard.resolve.len();
        for _ in 0..batch {
            let Some(record) = self.shard.resolve.pop() else {
                break;
            };
            self.process(record).await;
        }
    }

    async fn process(&self, record: AlertRecord) {
        let resolved = retrying(&record.def.name, || self.source.resolve(&record.def.name)).await;
        match resolved {
            Ok(()) => {
                tracing::info!(
                    shard = self.shard.index,
                    alert = %record.def.name,
                    "Resolution sent"
                );
            }
            Err(e) => {
                // no further retry this tick; the resolution signal is lost
                tracing::warn!(
                    shard = self.shard.index,
                    alert = %record.def.name,
                    error = %e,
                    "Resolution attempts exhausted, dropping attempt"
                );
            }
        }
        // in every case, ownership returns to polling
        self.shard.poll.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::test_definition;
    use crate::source::mock::MockSource;
    use std::sync::atomic::Ordering;

    fn make_worker() -> (Arc<Shard>, Arc<MockSource>, ResolveWorker) {
        let shard = Arc::new(Shard::new(0));
        let source = Arc::new(MockSource::new());
        let worker = ResolveWorker::new(
            Arc::clone(&shard),
            Arc::clone(&source) as Arc<dyn AlertSource>,
            Duration::from_secs(1),
        );
        (shard, source, worker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_dispatch_returns_record_to_poll() {
        let (shard, source, worker) = make_worker();
        shard
            .resolve
            .push(AlertRecord::new(test_definition("cpu", 10.0, 20.0)));

        worker.run_pass().await;

        assert_eq!(source.resolutions(), vec!["cpu".to_string()]);
        assert!(shard.resolve.is_empty());
        assert_eq!(shard.poll.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_resolution_still_returns_record_to_poll() {
        let (shard, source, worker) = make_worker();
        source.set_resolve_failing(true);
        shard
            .resolve
            .push(AlertRecord::new(test_definition("cpu", 10.0, 20.0)));

        worker.run_pass().await;

        assert_eq!(source.resolve_calls.load(Ordering::SeqCst), 3);
        // the record must never vanish from monitoring
        assert!(shard.resolve.is_empty());
        assert_eq!(shard.poll.len(), 1);
    }
}
