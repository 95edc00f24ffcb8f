//! Alerting System
//!
//! Reduces per-face drowsiness verdicts to a single debounced warning sound.

mod actuator;
mod coordinator;

pub use actuator::{ActuatorCall, AlertActuator, AlertDriver, AlertError, AlertHandle, LogActuator, RecordingActuator};
pub use coordinator::{AggregationPolicy, AlertCommand, AlertConfig, AlertCoordinator, AlertState};
