//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// How left and right eye-open probabilities are combined into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeCombine {
    /// Lowest of the two (either eye closing counts)
    #[default]
    Min,
    /// Average of the two
    Mean,
    /// Highest of the two (both eyes must close)
    Max,
}

impl EyeCombine {
    pub fn combine(self, left: f32, right: f32) -> f32 {
        match self {
            EyeCombine::Min => left.min(right),
            EyeCombine::Mean => (left + right) * 0.5,
            EyeCombine::Max => left.max(right),
        }
    }
}

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye-open probability below which a frame counts as closed
    pub closed_threshold: f32,

    /// Left/right combination rule
    pub eye_combine: EyeCombine,

    /// Sliding window length (frames)
    pub window_frames: usize,

    /// Minimum open/closed samples in the window before a verdict is allowed
    pub min_evidence: usize,

    /// Closed fraction that must be exceeded to become drowsy
    pub enter_fraction: f32,

    /// Closed fraction below which a drowsy face recovers
    pub exit_fraction: f32,

    /// Head pose limits (degrees); frames beyond these carry no evidence
    pub max_yaw_degrees: f32,
    pub max_pitch_degrees: f32,
    pub max_roll_degrees: f32,

    /// Frames a track may go unobserved before it is evicted
    pub stale_after_frames: u64,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            closed_threshold: 0.3,
            eye_combine: EyeCombine::Min,
            window_frames: 30,
            min_evidence: 10,
            enter_fraction: 0.7,
            exit_fraction: 0.4,
            max_yaw_degrees: 40.0,
            max_pitch_degrees: 35.0,
            max_roll_degrees: 45.0,
            stale_after_frames: 90,
        }
    }
}

impl DmsConfig {
    /// Create strict config (reacts sooner)
    pub fn strict() -> Self {
        Self {
            closed_threshold: 0.4,
            window_frames: 20,
            enter_fraction: 0.6,
            exit_fraction: 0.3,
            ..Default::default()
        }
    }

    /// Create lenient config (needs longer closure)
    pub fn lenient() -> Self {
        Self {
            closed_threshold: 0.2,
            window_frames: 45,
            min_evidence: 15,
            enter_fraction: 0.8,
            exit_fraction: 0.5,
            ..Default::default()
        }
    }

    /// Check thresholds and window sizes for consistency
    pub fn validate(&self) -> Result<(), DmsError> {
        for (name, value) in [
            ("closed_threshold", self.closed_threshold),
            ("enter_fraction", self.enter_fraction),
            ("exit_fraction", self.exit_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DmsError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.exit_fraction > self.enter_fraction {
            return Err(DmsError::InvalidConfig(format!(
                "exit_fraction {} exceeds enter_fraction {}",
                self.exit_fraction, self.enter_fraction
            )));
        }

        if self.window_frames == 0 {
            return Err(DmsError::InvalidConfig("window_frames must be > 0".into()));
        }

        if self.min_evidence > self.window_frames {
            return Err(DmsError::InvalidConfig(format!(
                "min_evidence {} can never be reached with window_frames {}",
                self.min_evidence, self.window_frames
            )));
        }

        for (name, value) in [
            ("max_yaw_degrees", self.max_yaw_degrees),
            ("max_pitch_degrees", self.max_pitch_degrees),
            ("max_roll_degrees", self.max_roll_degrees),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(DmsError::InvalidConfig(format!(
                    "{name} must be a non-negative angle, got {value}"
                )));
            }
        }

        Ok(())
    }
}
