//! Alert Coordinator Implementation

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How per-face verdicts combine into one alert decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Alert while at least one tracked face is drowsy
    #[default]
    Any,
    /// Alert only while every tracked face is drowsy (no faces: no alert)
    All,
}

impl AggregationPolicy {
    pub fn aggregate<I: IntoIterator<Item = bool>>(self, verdicts: I) -> bool {
        let mut verdicts = verdicts.into_iter().peekable();
        match self {
            AggregationPolicy::Any => verdicts.any(|v| v),
            AggregationPolicy::All => verdicts.peek().is_some() && verdicts.all(|v| v),
        }
    }
}

/// Alert configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Verdict aggregation policy (default: any face drowsy)
    pub policy: AggregationPolicy,
}

/// Command for the audio actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCommand {
    #[default]
    None,
    Start,
    Stop,
}

/// Actuator state as seen by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    #[default]
    Idle,
    Playing,
}

impl AlertState {
    /// Next state and the command that leads there
    pub fn transition(self, aggregate: bool) -> (AlertState, AlertCommand) {
        match (self, aggregate) {
            (AlertState::Idle, true) => (AlertState::Playing, AlertCommand::Start),
            (AlertState::Playing, false) => (AlertState::Idle, AlertCommand::Stop),
            (state, _) => (state, AlertCommand::None),
        }
    }

    pub fn is_playing(self) -> bool {
        self == AlertState::Playing
    }
}

/// Debounces per-face verdicts into start/stop commands
#[derive(Debug, Clone, Default)]
pub struct AlertCoordinator {
    config: AlertConfig,
    state: AlertState,
    /// Transitions into Playing since creation
    start_count: usize,
}

impl AlertCoordinator {
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert coordinator with config: {:?}", config);
        Self {
            config,
            state: AlertState::Idle,
            start_count: 0,
        }
    }

    /// Feed the verdicts of every tracked face for the current frame
    pub fn update<I: IntoIterator<Item = bool>>(&mut self, verdicts: I) -> AlertCommand {
        let aggregate = self.config.policy.aggregate(verdicts);
        self.step(aggregate)
    }

    fn step(&mut self, aggregate: bool) -> AlertCommand {
        let (next, command) = self.state.transition(aggregate);
        match command {
            AlertCommand::Start => {
                self.start_count += 1;
                info!("Drowsiness alert raised (count: {})", self.start_count);
            }
            AlertCommand::Stop => info!("Drowsiness alert cleared"),
            AlertCommand::None => debug!("Alert state unchanged: {:?}", self.state),
        }
        self.state = next;
        command
    }

    /// Force the alert off at session end
    pub fn shutdown(&mut self) -> AlertCommand {
        self.step(false)
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.config.policy
    }

    /// Number of times the alert has been raised
    pub fn start_count(&self) -> usize {
        self.start_count
    }
}
