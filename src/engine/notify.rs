//! Notify worker: cooldown-gated notification dispatch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use super::shard::Shard;
use super::ticker::Ticker;
use crate::alerts::AlertRecord;
use crate::source::{retrying, AlertSource};

/// Worker 2/3: once per tick, dispatches notifications for records whose
/// cooldown has elapsed. Whatever the outcome, every record goes back onto
/// the poll queue so monitoring continues.
pub struct NotifyWorker {
    shard: Arc<Shard>,
    source: Arc<dyn AlertSource>,
    interval: Duration,
}

impl NotifyWorker {
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
                        tracing::debug!(shard = self.shard.index, "Notify worker stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Process everything currently in the notify queue exactly once
    pub async fn run_pass(&self) {
        let batch = self.shard.notify.len();
        for _ in 0..batch {
            let Some(record) = self.shard.notify.pop() else {
                break;
            };
            self.process(record).await;
        }
    }

    async fn process(&self, mut record: AlertRecord) {
        if record.notification_due(Instant::now()) {
            let state = record.state.to_string();
            let delivered = retrying(&record.def.name, || {
                self.source.notify(&record.def.name, &state)
            })
            .await;
            match delivered {
                Ok(()) => {
                    record.triggered_at = Some(Instant::now());
                    tracing::info!(
                        shard = self.shard.index,
                        alert = %record.def.name,
                        state = %state,
                        "Notification triggered"
                    );
                }
                Err(e) => {
                    // cooldown state untouched: the next tick finds it due again
                    tracing::warn!(
                        shard = self.shard.index,
                        alert = %record.def.name,
                        error = %e,
                        "Notification attempts exhausted, will retry next tick"
                    );
                }
            }
        }
        // in every case, ownership returns to polling
        self.shard.poll.push(record);
    }
}
