//! Pure threshold evaluation

use super::config::AlertDefinition;
use super::record::AlertState;

/// Map a measured value onto an alert's threshold bands.
///
/// Critical is compared after warn, so when a misconfigured definition puts
/// `critical.value` at or below `warn.value` the critical label wins.
pub fn evaluate(def: &AlertDefinition, value: f64) -> AlertState {
    let mut state = AlertState::Pass;
    if value > def.warn.value {
        state = AlertState::Triggered(def.warn.message.clone());
    }
    if value > def.critical.value {
        state = AlertState::Triggered(def.critical.message.clone());
    }
    state
}
