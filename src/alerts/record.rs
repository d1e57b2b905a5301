//! Runtime alert records

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::config::AlertDefinition;

/// Evaluated state of an alert.
///
/// Non-pass states carry the literal threshold message, so the state space
/// is alert-specific rather than a fixed global enum: two alerts' warning
/// labels may differ in text while both meaning "breached warn, not critical".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertState {
    Pass,
    Triggered(String),
}

impl AlertState {
    pub fn is_pass(&self) -> bool {
        matches!(self, AlertState::Pass)
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertState::Pass => f.write_str("PASS"),
            AlertState::Triggered(message) => f.write_str(message),
        }
    }
}

/// One monitored check: its definition plus the mutable runtime state,
/// owned at any instant by exactly one shard queue.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub def: AlertDefinition,
    /// Current evaluated state
    pub state: AlertState,
    /// Last successful notification dispatch; `None` means never notified
    /// since the last PASS
    pub triggered_at: Option<Instant>,
}

impl AlertRecord {
    /// Wrap a validated definition in its initial runtime state
    pub fn new(def: AlertDefinition) -> Self {
        Self {
            def,
            state: AlertState::Pass,
            triggered_at: None,
        }
    }

    /// Evaluation stagger gate: the alert is only due on ticks where the
    /// wall clock lands inside a two-second window of its interval, which
    /// spreads load across alerts sharing a shard.
    pub fn is_due(&self, now_unix: i64) -> bool {
        now_unix.rem_euclid(self.def.interval_secs as i64) <= 1
    }

    /// Cooldown gate for repeat notifications: due when never notified since
    /// the last PASS, or when `repeat_interval_secs` has fully elapsed.
    pub fn notification_due(&self, now: Instant) -> bool {
        match self.triggered_at {
            None => true,
            Some(at) => {
                now.duration_since(at) >= Duration::from_secs(self.def.repeat_interval_secs)
            }
        }
    }
}
