//! Drowsiness Monitor
//!
//! Frame-processing glue between the external face detector, the per-face
//! drowsiness classifiers and the shared warning sound.

pub mod replay;
pub mod session;
pub mod settings;
pub mod shared;

pub use replay::{replay, ReplaySummary};
pub use session::{FrameReport, MonitorSession};
pub use settings::Settings;
pub use shared::SharedMonitor;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dms(#[from] dms::DmsError),

    #[error("Invalid log level: {0}")]
    LogLevel(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session lock poisoned: {0}")]
    Poisoned(String),
}

/// Initialize logging
pub fn init_logging(level: Level) -> Result<(), MonitorError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| MonitorError::Logging(e.to_string()))
}
