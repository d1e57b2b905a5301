//! Process configuration

/// Bounds applied to the worker tick interval
const MIN_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 3600;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shard count; bounded above by the alert count once the working set
    /// is known
    pub concurrency: usize,
    /// Worker tick interval in seconds
    pub interval_secs: u64,
    /// Base URL of the metric/notification source
    pub source_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            interval_secs: 2,
            source_url: "http://localhost:9090".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from `ALERT_EXEC_*` environment variables,
    /// falling back to defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let concurrency = std::env::var("ALERT_EXEC_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.concurrency);
        let interval_secs = std::env::var("ALERT_EXEC_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.interval_secs);
        let source_url =
            std::env::var("ALERT_EXEC_SOURCE_URL").unwrap_or(defaults.source_url);

        Self {
            concurrency,
            interval_secs,
            source_url,
        }
        .clamped()
    }

    /// Apply the sanity bounds
    pub fn clamped(mut self) -> Self {
        self.interval_secs = self.interval_secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS);
        if self.concurrency == 0 {
            self.concurrency = 1;
        }
        self
    }
}
