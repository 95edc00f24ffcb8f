//! Per-frame face observations handed over by the external detector

use serde::{Deserialize, Serialize};

use crate::config::DmsConfig;

/// Tracking ID assigned by the face detector
pub type TrackId = i64;

/// Head pose (Euler angles)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Yaw (left-right rotation) in degrees
    pub yaw: f32,
    /// Pitch (up-down tilt) in degrees
    pub pitch: f32,
    /// Roll (side tilt) in degrees
    pub roll: f32,
}

impl HeadPose {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Whether the face is turned too far for eye estimates to be trusted.
    /// A NaN angle is treated as off-axis.
    pub fn is_off_axis(&self, config: &DmsConfig) -> bool {
        !(self.yaw.abs() <= config.max_yaw_degrees
            && self.pitch.abs() <= config.max_pitch_degrees
            && self.roll.abs() <= config.max_roll_degrees)
    }
}

/// Eye and pose signals for one identity in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Left eye open probability (None when the detector could not tell)
    #[serde(default)]
    pub left_eye_open: Option<f32>,
    /// Right eye open probability
    #[serde(default)]
    pub right_eye_open: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<HeadPose>,
    /// Frame sequence number
    #[serde(default)]
    pub frame: u64,
    /// Capture timestamp (milliseconds)
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl Observation {
    pub fn new(frame: u64, left_eye_open: Option<f32>, right_eye_open: Option<f32>) -> Self {
        Self {
            left_eye_open,
            right_eye_open,
            frame,
            ..Default::default()
        }
    }

    /// Both eyes reported with the same probability
    pub fn eyes(frame: u64, open: f32) -> Self {
        Self::new(frame, Some(open), Some(open))
    }

    pub fn with_pose(mut self, pose: HeadPose) -> Self {
        self.head_pose = Some(pose);
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Reduce this observation to a single window sample
    pub fn sample(&self, config: &DmsConfig) -> EyeSample {
        if let Some(pose) = &self.head_pose {
            if pose.is_off_axis(config) {
                return EyeSample::Excluded;
            }
        }

        let left = self.left_eye_open.and_then(sanitize_probability);
        let right = self.right_eye_open.and_then(sanitize_probability);

        let openness = match (left, right) {
            (Some(l), Some(r)) => config.eye_combine.combine(l, r),
            (Some(p), None) | (None, Some(p)) => p,
            (None, None) => return EyeSample::Unknown,
        };

        if openness < config.closed_threshold {
            EyeSample::Closed
        } else {
            EyeSample::Open
        }
    }
}

/// Clamp detector noise into [0, 1]; NaN carries no information
fn sanitize_probability(p: f32) -> Option<f32> {
    if p.is_nan() {
        None
    } else {
        Some(p.clamp(0.0, 1.0))
    }
}

/// One frame's contribution to the closure window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSample {
    Open,
    Closed,
    /// Neither eye probability was available
    Unknown,
    /// Head pose too extreme to trust the eye estimates
    Excluded,
}

impl EyeSample {
    /// Whether the sample counts as evidence either way
    pub fn is_evidence(self) -> bool {
        matches!(self, EyeSample::Open | EyeSample::Closed)
    }
}

/// A detected face as reported by the detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    /// Tracking ID (absent when the detector lost the track)
    #[serde(default)]
    pub track_id: Option<TrackId>,
    #[serde(flatten)]
    pub observation: Observation,
}

/// All faces reported for one processed camera frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Frame sequence number
    pub frame: u64,
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
}

impl DetectionFrame {
    pub fn new(frame: u64, timestamp_ms: u64) -> Self {
        Self {
            frame,
            timestamp_ms,
            faces: Vec::new(),
        }
    }

    /// Add a face
    pub fn with_face(mut self, track_id: Option<TrackId>, observation: Observation) -> Self {
        self.faces.push(FaceObservation {
            track_id,
            observation,
        });
        self
    }
}
