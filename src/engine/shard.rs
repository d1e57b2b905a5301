//! Shard-local queues and working-set partitioning

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::alerts::AlertRecord;

/// Thread-safe FIFO of alert records with a non-blocking length snapshot.
/// Workers size each pass to the length captured at pass start, so records
/// requeued mid-pass wait for the next tick.
#[derive(Debug, Default)]
pub struct AlertQueue {
    items: Mutex<VecDeque<AlertRecord>>,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: AlertRecord) {
        self.items.lock().push_back(record);
    }

    pub fn pop(&self) -> Option<AlertRecord> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Isolated partition of the working set: three queues operated on by the
/// shard's poll, notify, and resolve workers. Shards never share queues,
/// and a record belongs to exactly one queue of one shard at any instant.
#[derive(Debug)]
pub struct Shard {
    pub index: usize,
    pub poll: AlertQueue,
    pub notify: AlertQueue,
    pub resolve: AlertQueue,
}

impl Shard {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            poll: AlertQueue::new(),
            notify: AlertQueue::new(),
            resolve: AlertQueue::new(),
        }
    }

    /// Total records currently held across the shard's queues
    pub fn record_count(&self) -> usize {
        self.poll.len() + self.notify.len() + self.resolve.len()
    }
}

/// Distribute records round-robin across `count` shards' poll queues.
/// `count` must already be clamped to `[1, records.len()]`; every record
/// lands in exactly one shard.
pub fn partition(records: Vec<AlertRecord>, count: usize) -> Vec<Arc<Shard>> {
    let shards: Vec<Arc<Shard>> = (0..count).map(|i| Arc::new(Shard::new(i))).collect();
    for (i, record) in records.into_iter().enumerate() {
        shards[i % count].poll.push(record);
    }
    shards
}
