//! Alert-Exec: Sharded Alert Execution Engine
//!
//! A long-running process that continuously evaluates a fixed set of
//! monitored checks ("alerts") against a remote metric source, drives each
//! through a PASS/WARNING/CRITICAL state machine, and dispatches
//! notification and resolution signals with bounded retries and a
//! per-alert cooldown.
//!
//! # Architecture
//!
//! - **Sharding**: the working set is split round-robin across isolated
//!   shards; each shard owns a poll, a notify, and a resolve queue
//! - **Workers**: three tokio tasks per shard cycle records between the
//!   shard's queues on a fixed tick; shards never share queues
//! - **Retries**: per-alert source calls get three attempts with a short
//!   backoff; a failing check is requeued untouched, never dropped
//! - **Cooldown**: repeat notifications for a still-failing alert are
//!   suppressed until its `repeatIntervalSecs` elapses
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use alert_exec::config::EngineConfig;
//! use alert_exec::engine::Engine;
//! use alert_exec::source::HttpSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_env();
//!     let source = Arc::new(HttpSource::new(config.source_url.as_str()));
//!     Engine::new(source, config).run().await
//! }
//! ```

pub mod alerts;
pub mod config;
pub mod engine;
pub mod source;

// Re-export commonly used types
pub use alerts::{AlertDefinition, AlertRecord, AlertState};
pub use config::EngineConfig;
pub use engine::Engine;
pub use source::{AlertSource, HttpSource, SourceError};
