//! Audio actuator seam and command execution

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::coordinator::{AlertCommand, AlertCoordinator, AlertState};

/// Handle of a playing alert instance (sound stream ID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertHandle(pub u32);

impl fmt::Display for AlertHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Errors reported by an actuator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Unknown alert handle: {0}")]
    UnknownHandle(AlertHandle),
}

/// External sound output driven by the coordinator
pub trait AlertActuator {
    /// Start the looping warning sound
    fn start_alert(&mut self) -> Result<AlertHandle, AlertError>;

    /// Stop a previously started warning sound
    fn stop_alert(&mut self, handle: AlertHandle) -> Result<(), AlertError>;
}

impl<A: AlertActuator + ?Sized> AlertActuator for Box<A> {
    fn start_alert(&mut self) -> Result<AlertHandle, AlertError> {
        (**self).start_alert()
    }

    fn stop_alert(&mut self, handle: AlertHandle) -> Result<(), AlertError> {
        (**self).stop_alert(handle)
    }
}

/// Coordinator plus actuator: executes each emitted command exactly once
pub struct AlertDriver<A> {
    coordinator: AlertCoordinator,
    actuator: A,
    /// Currently playing alert, if the actuator accepted the start
    active: Option<AlertHandle>,
}

impl<A: AlertActuator> AlertDriver<A> {
    pub fn new(coordinator: AlertCoordinator, actuator: A) -> Self {
        Self {
            coordinator,
            actuator,
            active: None,
        }
    }

    /// Update from this frame's verdicts and drive the actuator
    pub fn apply<I: IntoIterator<Item = bool>>(&mut self, verdicts: I) -> AlertCommand {
        let command = self.coordinator.update(verdicts);
        self.execute(command);
        command
    }

    /// Stop the alert if it is playing
    pub fn shutdown(&mut self) -> AlertCommand {
        let command = self.coordinator.shutdown();
        self.execute(command);
        command
    }

    // Failures are logged and never retried; the coordinator state stands.
    fn execute(&mut self, command: AlertCommand) {
        match command {
            AlertCommand::Start => match self.actuator.start_alert() {
                Ok(handle) => {
                    info!("Warning sound started ({})", handle);
                    self.active = Some(handle);
                }
                Err(e) => warn!("Failed to start warning sound: {}", e),
            },
            AlertCommand::Stop => match self.active.take() {
                Some(handle) => match self.actuator.stop_alert(handle) {
                    Ok(()) => info!("Warning sound stopped ({})", handle),
                    Err(e) => warn!("Failed to stop warning sound {}: {}", handle, e),
                },
                None => debug!("Stop issued with no active sound"),
            },
            AlertCommand::None => {}
        }
    }

    pub fn state(&self) -> AlertState {
        self.coordinator.state()
    }

    pub fn active_handle(&self) -> Option<AlertHandle> {
        self.active
    }

    pub fn coordinator(&self) -> &AlertCoordinator {
        &self.coordinator
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }
}

/// Call received by a [`RecordingActuator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Start(AlertHandle),
    Stop(AlertHandle),
}

/// In-memory actuator that records every call
#[derive(Debug, Default)]
pub struct RecordingActuator {
    calls: Vec<ActuatorCall>,
    next_handle: u32,
    /// Fail the next start with `DeviceUnavailable`
    pub fail_next_start: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[ActuatorCall] {
        &self.calls
    }

    pub fn starts(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, ActuatorCall::Start(_))).count()
    }

    pub fn stops(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, ActuatorCall::Stop(_))).count()
    }
}

impl AlertActuator for RecordingActuator {
    fn start_alert(&mut self) -> Result<AlertHandle, AlertError> {
        if std::mem::take(&mut self.fail_next_start) {
            return Err(AlertError::DeviceUnavailable("recording actuator".into()));
        }
        self.next_handle += 1;
        let handle = AlertHandle(self.next_handle);
        self.calls.push(ActuatorCall::Start(handle));
        Ok(handle)
    }

    fn stop_alert(&mut self, handle: AlertHandle) -> Result<(), AlertError> {
        self.calls.push(ActuatorCall::Stop(handle));
        Ok(())
    }
}

/// Actuator that only logs; used when no audio output is attached
#[derive(Debug, Default)]
pub struct LogActuator {
    next_handle: u32,
    playing: Option<AlertHandle>,
}

impl LogActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(&self) -> Option<AlertHandle> {
        self.playing
    }
}

impl AlertActuator for LogActuator {
    fn start_alert(&mut self) -> Result<AlertHandle, AlertError> {
        self.next_handle += 1;
        let handle = AlertHandle(self.next_handle);
        info!(target: "alert", "START warning sound {}", handle);
        self.playing = Some(handle);
        Ok(handle)
    }

    fn stop_alert(&mut self, handle: AlertHandle) -> Result<(), AlertError> {
        if self.playing != Some(handle) {
            return Err(AlertError::UnknownHandle(handle));
        }
        info!(target: "alert", "STOP warning sound {}", handle);
        self.playing = None;
        Ok(())
    }
}
