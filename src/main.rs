//! Alert-Exec
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - ALERT_EXEC_SOURCE_URL: Base URL of the metric source (default: http://localhost:9090)
//! - ALERT_EXEC_CONCURRENCY: Number of worker shards (default: 4, clamped to the alert count)
//! - ALERT_EXEC_INTERVAL_SECS: Worker tick interval in seconds (default: 2, clamped to [1, 3600])
//! - RUST_LOG: Log level (default: info)

use std::sync::Arc;

use alert_exec::config::EngineConfig;
use alert_exec::engine::Engine;
use alert_exec::source::HttpSource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alert_exec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();

    tracing::info!("Alert-Exec configuration:");
    tracing::info!("  Source: {}", config.source_url);
    tracing::info!("  Concurrency: {}", config.concurrency);
    tracing::info!("  Tick interval: {} seconds", config.interval_secs);

    println!(
        r#"
    _    _           _     _____
   / \  | | ___ _ __| |_  | ____|_  _____  ___
  / _ \ | |/ _ \ '__| __| |  _| \ \/ / _ \/ __|
 / ___ \| |  __/ |  | |_  | |___ >  <  __/ (__
/_/   \_\_|\___|_|   \__| |_____/_/\_\___|\___|

 Sharded Alert Execution Engine
 Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    let source = Arc::new(HttpSource::new(config.source_url.as_str()));
    Engine::new(source, config).run().await
}
