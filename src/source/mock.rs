//! Scripted in-memory source for worker tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AlertSource, SourceError};
use crate::alerts::AlertDefinition;

/// Test double with per-query scripted outcomes and call recorders.
/// A scripted `None` outcome fails that query attempt; an exhausted or
/// missing script also fails, so tests must script every expected attempt.
#[derive(Default)]
pub struct MockSource {
    definitions: Mutex<Vec<AlertDefinition>>,
    /// list_alerts fails this many times before serving definitions
    list_failures: AtomicUsize,
    scripts: Mutex<HashMap<String, VecDeque<Option<f64>>>>,
    notify_failing: AtomicBool,
    resolve_failing: AtomicBool,
    notified: Mutex<Vec<(String, String)>>,
    resolved: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub notify_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_definitions(&self, defs: Vec<AlertDefinition>) {
        *self.definitions.lock() = defs;
    }

    pub fn fail_list_times(&self, count: usize) {
        self.list_failures.store(count, Ordering::SeqCst);
    }

    /// Queue outcomes for a query expression, consumed one per attempt
    pub fn script(&self, query: &str, outcomes: Vec<Option<f64>>) {
        self.scripts
            .lock()
            .entry(query.to_string())
            .or_default()
            .extend(outcomes);
    }

    pub fn set_notify_failing(&self, failing: bool) {
        self.notify_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_resolve_failing(&self, failing: bool) {
        self.resolve_failing.store(failing, Ordering::SeqCst);
    }

    /// Notifications dispatched so far, as (name, state) pairs
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notified.lock().clone()
    }

    /// Names resolved so far
    pub fn resolutions(&self) -> Vec<String> {
        self.resolved.lock().clone()
    }
}

#[async_trait]
impl AlertSource for MockSource {
    async fn list_alerts(&self) -> Result<Vec<AlertDefinition>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.list_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.list_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SourceError::Network("source unreachable".to_string()));
        }
        Ok(self.definitions.lock().clone())
    }

    async fn query(&self, query: &str) -> Result<f64, SourceError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        match self.scripts.lock().get_mut(query).and_then(|q| q.pop_front()) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(SourceError::Network("scripted query failure".to_string())),
            None => Err(SourceError::Network("no scripted response".to_string())),
        }
    }

    async fn notify(&self, name: &str, state: &str) -> Result<(), SourceError> {
        self.notify_calls.fetch_add(1, Ordering::SeqCst);
        if self.notify_failing.load(Ordering::SeqCst) {
            return Err(SourceError::Remote("notify endpoint down".to_string()));
        }
        self.notified
            .lock()
            .push((name.to_string(), state.to_string()));
        Ok(())
    }

    async fn resolve(&self, name: &str) -> Result<(), SourceError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.resolve_failing.load(Ordering::SeqCst) {
            return Err(SourceError::Remote("resolve endpoint down".to_string()));
        }
        self.resolved.lock().push(name.to_string());
        Ok(())
    }
}
