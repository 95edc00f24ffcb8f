//! Fixed-length window of recent eye samples

use std::collections::VecDeque;

use crate::observation::EyeSample;

/// Sliding window over the most recent frames with running counts
#[derive(Debug, Clone)]
pub struct ClosureWindow {
    samples: VecDeque<EyeSample>,
    capacity: usize,
    closed: usize,
    open: usize,
}

impl ClosureWindow {
    /// Create a window holding `capacity` frames (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            closed: 0,
            open: 0,
        }
    }

    /// Push a sample, dropping the oldest once full
    pub fn push(&mut self, sample: EyeSample) {
        if self.samples.len() >= self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.adjust(old, false);
            }
        }
        self.adjust(sample, true);
        self.samples.push_back(sample);
    }

    fn adjust(&mut self, sample: EyeSample, add: bool) {
        let counter = match sample {
            EyeSample::Closed => &mut self.closed,
            EyeSample::Open => &mut self.open,
            EyeSample::Unknown | EyeSample::Excluded => return,
        };
        if add {
            *counter += 1;
        } else {
            *counter -= 1;
        }
    }

    /// Number of frames in the window, evidence or not
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Open plus closed samples
    pub fn evidence(&self) -> usize {
        self.closed + self.open
    }

    pub fn closed(&self) -> usize {
        self.closed
    }

    /// Fraction of evidence frames that were closed (0.0 without evidence)
    pub fn closure_fraction(&self) -> f32 {
        let evidence = self.evidence();
        if evidence == 0 {
            return 0.0;
        }
        self.closed as f32 / evidence as f32
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.closed = 0;
        self.open = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_eviction() {
        let mut window = ClosureWindow::new(3);
        window.push(EyeSample::Closed);
        window.push(EyeSample::Open);
        window.push(EyeSample::Unknown);
        assert_eq!(window.evidence(), 2);
        assert_eq!(window.closed(), 1);

        // Oldest (Closed) falls out
        window.push(EyeSample::Open);
        assert_eq!(window.len(), 3);
        assert_eq!(window.closed(), 0);
        assert_eq!(window.evidence(), 2);
    }

    #[test]
    fn test_fraction_ignores_missing_evidence() {
        let mut window = ClosureWindow::new(10);
        window.push(EyeSample::Closed);
        window.push(EyeSample::Excluded);
        window.push(EyeSample::Unknown);
        window.push(EyeSample::Open);
        assert!((window.closure_fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_window() {
        let mut window = ClosureWindow::new(0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.closure_fraction(), 0.0);
        window.push(EyeSample::Closed);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.evidence(), 0);
    }
}
