//! Driver Monitoring System (DMS)
//!
//! Turns per-frame face observations into per-face drowsiness verdicts:
//! - Eye-open probabilities reduced to open/closed samples
//! - Off-axis head poses excluded as unreliable
//! - Sliding-window closure fraction with a hysteresis band
//! - Tracking-ID registry with staleness eviction

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod observation;
pub mod registry;
pub mod window;

pub use analysis::FaceVerdict;
pub use classifier::{hysteresis_step, DrowsinessClassifier};
pub use config::{DmsConfig, EyeCombine};
pub use observation::{DetectionFrame, EyeSample, FaceObservation, HeadPose, Observation, TrackId};
pub use registry::{TrackEntry, TrackRegistry};
pub use window::ClosureWindow;

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}
