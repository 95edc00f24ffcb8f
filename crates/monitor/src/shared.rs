//! Session shared across detector callback threads

use std::sync::{Arc, Mutex, MutexGuard};

use alerting::{AlertActuator, AlertCommand, AlertState};
use dms::{DetectionFrame, TrackId};

use crate::session::{FrameReport, MonitorSession};
use crate::MonitorError;

/// Cloneable handle to a [`MonitorSession`].
///
/// One lock is held for the whole frame so the aggregate verdict always sees
/// a consistent set of tracks.
pub struct SharedMonitor<A: AlertActuator> {
    inner: Arc<Mutex<MonitorSession<A>>>,
}

impl<A: AlertActuator> Clone for SharedMonitor<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AlertActuator> SharedMonitor<A> {
    pub fn new(session: MonitorSession<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MonitorSession<A>>, MonitorError> {
        self.inner
            .lock()
            .map_err(|e| MonitorError::Poisoned(format!("Lock error: {}", e)))
    }

    pub fn process_frame(&self, frame: &DetectionFrame) -> Result<FrameReport, MonitorError> {
        Ok(self.lock()?.process_frame(frame))
    }

    pub fn report_detection_failure(&self, frame: u64, err: impl std::fmt::Display) -> Result<(), MonitorError> {
        self.lock()?.report_detection_failure(frame, err);
        Ok(())
    }

    pub fn stop(&self) -> Result<AlertCommand, MonitorError> {
        Ok(self.lock()?.stop())
    }

    pub fn alert_state(&self) -> Result<AlertState, MonitorError> {
        Ok(self.lock()?.alert_state())
    }

    pub fn verdicts(&self) -> Result<Vec<(TrackId, bool)>, MonitorError> {
        Ok(self.lock()?.verdicts())
    }

    /// Run `f` with exclusive access to the session
    pub fn with_session<R>(&self, f: impl FnOnce(&mut MonitorSession<A>) -> R) -> Result<R, MonitorError> {
        Ok(f(&mut *self.lock()?))
    }
}
