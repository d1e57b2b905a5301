//! Fixed-interval tick timing shared by all worker kinds

use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};

/// Periodic timer: after a pass, the next tick waits out
/// `max(0, interval - elapsed work)`, so a pass that overruns its interval
/// starts the next one immediately instead of bursting to catch up.
pub struct Ticker {
    inner: Interval,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        let mut inner = interval(period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner }
    }

    /// Wait for the next tick; the first call completes immediately
    pub async fn tick(&mut self) {
        self.inner.tick().await;
    }
}
