//! Per-face results for display

use serde::{Deserialize, Serialize};

use crate::classifier::DrowsinessClassifier;
use crate::observation::{HeadPose, TrackId};

/// Verdict of one tracked face for the current frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceVerdict {
    pub track_id: TrackId,

    /// Whether the face is currently judged drowsy
    pub drowsy: bool,

    /// Closed fraction of the recent window (PERCLOS-style)
    pub closure_fraction: f32,

    /// Open/closed samples backing the verdict
    pub evidence: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<HeadPose>,
}

impl FaceVerdict {
    pub fn from_classifier(track_id: TrackId, classifier: &DrowsinessClassifier, head_pose: Option<HeadPose>) -> Self {
        Self {
            track_id,
            drowsy: classifier.verdict(),
            closure_fraction: classifier.closure_fraction(),
            evidence: classifier.evidence(),
            head_pose,
        }
    }
}
