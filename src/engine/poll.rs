//! Poll worker: evaluate due alerts and route them onward

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use super::shard::Shard;
use super::ticker::Ticker;
use crate::alerts::{evaluate, AlertRecord, AlertState};
use crate::source::{retrying, AlertSource};

/// Worker 1/3: once per tick, queries the metric source for every due alert
/// in the shard's poll queue, runs the state machine, and routes each record
/// to the notify queue, the resolve queue, or back onto the poll queue.
pub struct PollWorker {
    shard: Arc<Shard>,
    source: Arc<dyn AlertSource>,
    interval: Duration,
}

impl PollWorker {
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
                        tracing::debug!(shard = self.shard.index, "Poll worker stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Process everything currently in the poll queue exactly once.
    /// Records pushed during the pass wait for the next tick.
    pub async fn run_pass(&self) {
        let now_unix = Utc::now().timestamp();
        let batch = self.shard.poll.len();
        for _ in 0..batch {
            let Some(record) = self.shard.poll.pop() else {
                break;
            };
            self.process(record, now_unix).await;
        }
    }

    async fn process(&self, mut record: AlertRecord, now_unix: i64) {
        if !record.is_due(now_unix) {
            self.shard.poll.push(record);
            return;
        }

        let queried = retrying(&record.def.name, || self.source.query(&record.def.query)).await;
        let value = match queried {
            Ok(value) => value,
            Err(e) => {
                // transient source failure never mutates or loses a record
                tracing::warn!(
                    shard = self.shard.index,
                    alert = %record.def.name,
                    error = %e,
                    "Query attempts exhausted, requeueing untouched"
                );
                self.shard.poll.push(record);
                return;
            }
        };

        let new_state = evaluate(&record.def, value);

        if !new_state.is_pass() {
            if record.state != new_state {
                record.state = new_state;
                record.triggered_at = None;
            }
            tracing::debug!(
                shard = self.shard.index,
                alert = %record.def.name,
                state = %record.state,
                value,
                "Routing to notify queue"
            );
            // the notify worker returns ownership to the poll queue
            self.shard.notify.push(record);
            return;
        }

        if !record.state.is_pass() {
            record.state = AlertState::Pass;
            record.triggered_at = None;
            tracing::info!(
                shard = self.shard.index,
                alert = %record.def.name,
                value,
                "Alert recovered, routing to resolve queue"
            );
            // the resolve worker returns ownership to the poll queue
            self.shard.resolve.push(record);
            return;
        }

        self.shard.poll.push(record);
    }
}
