//! Alert definition types and load-time validation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Threshold band: numeric set-point plus the state label reported when crossed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threshold {
    /// Comparison set-point; values strictly above it are in this band
    pub value: f64,
    /// State label carried by alerts in this band
    pub message: String,
}

/// Alert definition as returned by the metric source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDefinition {
    /// Unique name within the working set
    pub name: String,
    /// Opaque expression passed verbatim to the metric source
    pub query: String,
    /// Evaluation stagger interval; the alert is only due on ticks landing
    /// inside a small window of this interval
    #[serde(rename = "intervalSecs")]
    pub interval_secs: u64,
    /// Cooldown between repeated notifications while still failing
    #[serde(rename = "repeatIntervalSecs")]
    pub repeat_interval_secs: u64,
    /// Warning band
    pub warn: Threshold,
    /// Critical band; must be a strictly worse condition than `warn`
    pub critical: Threshold,
    /// Unrecognized extension keys, preserved as-is
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl AlertDefinition {
    /// Check the load-time preconditions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                name: self.name.clone(),
            });
        }
        if self.critical.value < self.warn.value {
            return Err(ConfigError::InvertedThresholds {
                name: self.name.clone(),
                warn: self.warn.value,
                critical: self.critical.value,
            });
        }
        Ok(())
    }
}

/// Filter a fetched definition list down to the valid subset.
/// Invalid entries are dropped with a warning rather than aborting startup.
pub fn validate_definitions(definitions: Vec<AlertDefinition>) -> Vec<AlertDefinition> {
    definitions
        .into_iter()
        .filter(|def| match def.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(alert = %def.name, error = %e, "Rejecting invalid alert definition");
                false
            }
        })
        .collect()
}

/// Definition validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Alert {name} has a zero evaluation interval")]
    ZeroInterval { name: String },

    #[error("Alert {name} has critical threshold {critical} below warn threshold {warn}")]
    InvertedThresholds {
        name: String,
        warn: f64,
        critical: f64,
    },
}
