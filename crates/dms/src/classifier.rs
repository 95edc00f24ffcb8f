//! Per-face drowsiness classification
//!
//! Each tracked face owns a [`DrowsinessClassifier`]. Every frame is reduced
//! to an [`EyeSample`] and pushed into a fixed-length [`ClosureWindow`]. The
//! verdict is driven by the closed fraction of that window with two
//! thresholds: a face becomes drowsy once it reaches `enter_fraction` and recovers
//! only below `exit_fraction`, so blinks and detector jitter inside the band
//! cannot flip it.

use tracing::{debug, info};

use crate::config::DmsConfig;
use crate::observation::{EyeSample, Observation};
use crate::window::ClosureWindow;

/// Next verdict from the previous one and the current window statistics.
///
/// Without `min_evidence` open/closed samples the face is never drowsy.
pub fn hysteresis_step(previous: bool, closure_fraction: f32, evidence: usize, config: &DmsConfig) -> bool {
    if evidence < config.min_evidence {
        return false;
    }
    if previous {
        closure_fraction >= config.exit_fraction
    } else {
        closure_fraction >= config.enter_fraction
    }
}

/// Temporal drowsiness classifier for a single tracked face
#[derive(Debug, Clone)]
pub struct DrowsinessClassifier {
    config: DmsConfig,
    window: ClosureWindow,
    drowsy: bool,
    /// Frame at which the verdict last changed
    last_flip_frame: Option<u64>,
    /// Most recent frame observed
    last_frame: Option<u64>,
}

impl DrowsinessClassifier {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            window: ClosureWindow::new(config.window_frames),
            config: config.clone(),
            drowsy: false,
            last_flip_frame: None,
            last_frame: None,
        }
    }

    /// Feed one frame and return the updated verdict
    pub fn observe(&mut self, observation: &Observation) -> bool {
        let sample = observation.sample(&self.config);
        self.push_sample(sample, observation.frame)
    }

    /// Feed a pre-computed sample for `frame`
    pub fn push_sample(&mut self, sample: EyeSample, frame: u64) -> bool {
        if let Some(last) = self.last_frame {
            if frame < last {
                debug!("Out-of-order frame {} after {}", frame, last);
            }
        }
        self.last_frame = Some(frame);
        self.window.push(sample);

        let next = hysteresis_step(
            self.drowsy,
            self.window.closure_fraction(),
            self.window.evidence(),
            &self.config,
        );

        if next != self.drowsy {
            info!(
                "Drowsiness verdict {} -> {} at frame {} (closure {:.2}, evidence {})",
                self.drowsy,
                next,
                frame,
                self.window.closure_fraction(),
                self.window.evidence()
            );
            self.drowsy = next;
            self.last_flip_frame = Some(frame);
        }

        self.drowsy
    }

    /// Current verdict
    pub fn verdict(&self) -> bool {
        self.drowsy
    }

    /// Closed fraction of the evidence currently in the window
    pub fn closure_fraction(&self) -> f32 {
        self.window.closure_fraction()
    }

    /// Open plus closed samples in the window
    pub fn evidence(&self) -> usize {
        self.window.evidence()
    }

    pub fn last_flip_frame(&self) -> Option<u64> {
        self.last_flip_frame
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    pub fn window(&self) -> &ClosureWindow {
        &self.window
    }

    /// Forget all history (on driver change)
    pub fn reset(&mut self) {
        self.window.clear();
        self.drowsy = false;
        self.last_flip_frame = None;
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(classifier: &mut DrowsinessClassifier, start: u64, count: u64, open: f32) -> Vec<bool> {
        (start..start + count)
            .map(|frame| classifier.observe(&Observation::eyes(frame, open)))
            .collect()
    }

    #[test]
    fn test_open_eyes_never_drowsy() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        let verdicts = feed(&mut classifier, 0, 100, 0.95);
        assert!(verdicts.iter().all(|v| !v));
    }

    #[test]
    fn test_sustained_closure_within_window() {
        let config = DmsConfig::default();
        let mut classifier = DrowsinessClassifier::new(&config);
        let verdicts = feed(&mut classifier, 0, config.window_frames as u64, 0.05);

        // Not drowsy before minimum evidence is collected
        assert!(verdicts[..config.min_evidence - 1].iter().all(|v| !v));
        assert!(*verdicts.last().unwrap());
        assert_eq!(classifier.last_flip_frame(), Some(config.min_evidence as u64 - 1));
    }

    #[test]
    fn test_hysteresis_holds_inside_band() {
        let config = DmsConfig::default();
        let mut classifier = DrowsinessClassifier::new(&config);
        feed(&mut classifier, 0, 30, 0.05);
        assert!(classifier.verdict());

        // 12 open frames: 18/30 closed = 0.6, below enter but above exit
        let verdicts = feed(&mut classifier, 30, 12, 0.95);
        assert!(verdicts.iter().all(|&v| v));
        assert!(classifier.closure_fraction() < config.enter_fraction);

        // Keep opening until the fraction drops under exit
        let verdicts = feed(&mut classifier, 42, 10, 0.95);
        assert!(!*verdicts.last().unwrap());
    }

    #[test]
    fn test_recovery_frame_is_exact() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        feed(&mut classifier, 0, 30, 0.0);

        // 18 open -> 12/30 = 0.4, not below exit
        feed(&mut classifier, 30, 18, 1.0);
        assert!(classifier.verdict());
        // 19 open -> 11/30 < 0.4
        feed(&mut classifier, 48, 1, 1.0);
        assert!(!classifier.verdict());
        assert_eq!(classifier.last_flip_frame(), Some(48));
    }

    #[test]
    fn test_exact_enter_fraction_after_ramp() {
        let config = DmsConfig::default();
        let mut classifier = DrowsinessClassifier::new(&config);
        feed(&mut classifier, 0, 9, 0.9);
        let verdicts = feed(&mut classifier, 9, 21, 0.05);

        assert_eq!(classifier.window().len(), 30);
        assert_eq!(classifier.window().closed(), 21);
        assert!((classifier.closure_fraction() - config.enter_fraction).abs() < 1e-6);
        assert!(*verdicts.last().unwrap());
        assert_eq!(classifier.last_flip_frame(), Some(29));
    }

    #[test]
    fn test_single_blink_rejected() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        feed(&mut classifier, 0, 20, 0.9);
        assert!(!classifier.observe(&Observation::eyes(20, 0.0)));
        let verdicts = feed(&mut classifier, 21, 20, 0.9);
        assert!(verdicts.iter().all(|v| !v));
    }

    #[test]
    fn test_unknown_frames_do_not_count_as_closed() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        for frame in 0..60 {
            assert!(!classifier.observe(&Observation::new(frame, None, None)));
        }
        assert_eq!(classifier.evidence(), 0);
    }

    #[test]
    fn test_losing_evidence_clears_verdict() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        feed(&mut classifier, 0, 30, 0.0);
        assert!(classifier.verdict());

        // Face turns away: samples age out until evidence drops under minimum
        let mut frame = 30;
        while classifier.evidence() >= 10 {
            classifier.observe(&Observation::eyes(frame, 0.0).with_pose(crate::HeadPose::new(80.0, 0.0, 0.0)));
            frame += 1;
        }
        assert!(!classifier.verdict());
    }

    #[test]
    fn test_reset() {
        let mut classifier = DrowsinessClassifier::new(&DmsConfig::default());
        feed(&mut classifier, 0, 30, 0.0);
        classifier.reset();
        assert!(!classifier.verdict());
        assert_eq!(classifier.evidence(), 0);
        assert_eq!(classifier.last_flip_frame(), None);
    }

    #[test]
    fn test_hysteresis_step_is_pure() {
        let config = DmsConfig::default();
        assert!(!hysteresis_step(false, 0.69, 30, &config));
        assert!(hysteresis_step(false, 0.7, 30, &config));
        assert!(hysteresis_step(true, 0.4, 30, &config));
        assert!(!hysteresis_step(true, 0.39, 30, &config));
        assert!(!hysteresis_step(true, 1.0, 9, &config));
    }
}
