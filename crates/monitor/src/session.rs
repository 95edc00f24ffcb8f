//! Per-frame processing session

use std::fmt::Display;

use alerting::{AlertActuator, AlertCommand, AlertConfig, AlertCoordinator, AlertDriver, AlertState};
use dms::{DetectionFrame, DmsConfig, FaceVerdict, TrackId, TrackRegistry};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::settings::Settings;
use crate::MonitorError;

/// Outcome of processing one detection frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    /// Verdicts of the faces seen in this frame, for the overlay
    pub faces: Vec<FaceVerdict>,
    /// Command issued to the actuator this frame
    pub command: AlertCommand,
    pub alert_state: AlertState,
    /// Faces reported without a tracking ID
    #[serde(skip_serializing_if = "is_zero")]
    pub dropped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evicted: Vec<TrackId>,
    /// Tracks held after eviction
    pub tracked: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Drowsiness monitoring session: registry, coordinator and actuator
pub struct MonitorSession<A: AlertActuator> {
    registry: TrackRegistry,
    alerts: AlertDriver<A>,
    stopped: bool,
}

impl<A: AlertActuator> MonitorSession<A> {
    pub fn new(dms: DmsConfig, alert: AlertConfig, actuator: A) -> Result<Self, MonitorError> {
        dms.validate()?;
        info!(
            "Starting monitor session: window {} frames, enter {:.2}, exit {:.2}, policy {:?}",
            dms.window_frames, dms.enter_fraction, dms.exit_fraction, alert.policy
        );
        Ok(Self {
            registry: TrackRegistry::new(dms),
            alerts: AlertDriver::new(AlertCoordinator::new(alert), actuator),
            stopped: false,
        })
    }

    pub fn from_settings(settings: &Settings, actuator: A) -> Result<Self, MonitorError> {
        Self::new(settings.dms.clone(), settings.alert.clone(), actuator)
    }

    /// Classify every tracked face in `frame` and drive the alert
    pub fn process_frame(&mut self, frame: &DetectionFrame) -> FrameReport {
        if self.stopped {
            warn!("Frame {} received after session stop; ignored", frame.frame);
            return FrameReport {
                frame: frame.frame,
                ..Default::default()
            };
        }

        let mut faces = Vec::with_capacity(frame.faces.len());
        let mut dropped = 0;

        for face in &frame.faces {
            let Some(track_id) = face.track_id else {
                debug!("Dropping face without tracking ID at frame {}", frame.frame);
                dropped += 1;
                continue;
            };

            let mut observation = face.observation.clone();
            observation.frame = frame.frame;
            observation.timestamp_ms = frame.timestamp_ms;

            trace!(
                "Face {} at frame {}: left eye {:?}, right eye {:?}, pose {:?}",
                track_id,
                frame.frame,
                observation.left_eye_open,
                observation.right_eye_open,
                observation.head_pose
            );

            let classifier = self.registry.get_or_create(track_id, frame.frame);
            classifier.observe(&observation);
            faces.push(FaceVerdict::from_classifier(track_id, classifier, observation.head_pose));
        }

        let evicted = self.registry.evict_stale(frame.frame);
        let command = self.alerts.apply(self.registry.verdicts().map(|(_, drowsy)| drowsy));

        FrameReport {
            frame: frame.frame,
            faces,
            command,
            alert_state: self.alerts.state(),
            dropped,
            evicted,
            tracked: self.registry.len(),
        }
    }

    /// Log a detector failure; the frame contributes nothing
    pub fn report_detection_failure(&mut self, frame: u64, err: impl Display) {
        error!("Face detection failed at frame {}: {}", frame, err);
    }

    /// Stop the alert if playing and release all state. Safe to call twice.
    pub fn stop(&mut self) -> AlertCommand {
        if self.stopped {
            return AlertCommand::None;
        }
        let command = self.alerts.shutdown();
        let released = self.registry.len();
        self.registry.clear();
        self.stopped = true;
        info!("Monitor session stopped ({} tracks released)", released);
        command
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts.state()
    }

    /// Verdict of every tracked face, sorted by tracking ID
    pub fn verdicts(&self) -> Vec<(TrackId, bool)> {
        let mut verdicts: Vec<_> = self.registry.verdicts().collect();
        verdicts.sort_unstable();
        verdicts
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn actuator(&self) -> &A {
        self.alerts.actuator()
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        self.alerts.actuator_mut()
    }
}

impl<A: AlertActuator> Drop for MonitorSession<A> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::RecordingActuator;
    use dms::Observation;

    fn session() -> MonitorSession<RecordingActuator> {
        MonitorSession::new(DmsConfig::default(), AlertConfig::default(), RecordingActuator::new()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DmsConfig {
            window_frames: 0,
            ..Default::default()
        };
        let result = MonitorSession::new(config, AlertConfig::default(), RecordingActuator::new());
        assert!(matches!(result, Err(MonitorError::Dms(_))));
    }

    #[test]
    fn test_faces_without_track_dropped() {
        let mut session = session();
        let frame = DetectionFrame::new(0, 0)
            .with_face(None, Observation::eyes(0, 0.0))
            .with_face(Some(4), Observation::eyes(0, 0.9));
        let report = session.process_frame(&frame);

        assert_eq!(report.dropped, 1);
        assert_eq!(report.faces.len(), 1);
        assert_eq!(report.faces[0].track_id, 4);
        assert_eq!(report.tracked, 1);
    }

    #[test]
    fn test_frame_index_stamped_on_observations() {
        let mut session = session();
        // Observation carries a bogus frame; the frame's own index wins
        let frame = DetectionFrame::new(200, 6600).with_face(Some(1), Observation::eyes(3, 0.9).with_timestamp(99));
        assert_eq!(frame.faces[0].observation.frame, 3);

        session.process_frame(&frame);
        let entry = session.registry().get(1).unwrap();
        assert_eq!(entry.last_seen, 200);
        assert_eq!(entry.classifier.last_frame(), Some(200));
    }

    #[test]
    fn test_sustained_closure_starts_alert() {
        let mut session = session();
        let mut commands = Vec::new();
        for frame in 0..40 {
            let report = session.process_frame(&DetectionFrame::new(frame, frame * 33).with_face(Some(1), Observation::eyes(0, 0.05)));
            commands.push(report.command);
        }
        assert_eq!(commands.iter().filter(|c| **c == AlertCommand::Start).count(), 1);
        assert_eq!(session.alert_state(), AlertState::Playing);
        assert_eq!(session.actuator().starts(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = session();
        for frame in 0..30 {
            session.process_frame(&DetectionFrame::new(frame, 0).with_face(Some(1), Observation::eyes(0, 0.0)));
        }
        assert_eq!(session.stop(), AlertCommand::Stop);
        assert_eq!(session.stop(), AlertCommand::None);
        assert!(session.registry().is_empty());
        assert_eq!(session.actuator().stops(), 1);

        let report = session.process_frame(&DetectionFrame::new(31, 0).with_face(Some(1), Observation::eyes(0, 0.0)));
        assert_eq!(report.command, AlertCommand::None);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_detection_failure_changes_nothing() {
        let mut session = session();
        session.process_frame(&DetectionFrame::new(0, 0).with_face(Some(1), Observation::eyes(0, 0.9)));
        session.report_detection_failure(1, "model timeout");
        assert_eq!(session.verdicts(), vec![(1, false)]);
        assert_eq!(session.alert_state(), AlertState::Idle);
    }
}
