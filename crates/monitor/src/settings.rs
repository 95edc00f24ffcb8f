//! Layered settings: optional config file overridden by `DROWSY_*` env vars

use std::path::Path;

use alerting::AlertConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use dms::DmsConfig;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::MonitorError;

/// Environment variable prefix, e.g. `DROWSY_DMS__WINDOW_FRAMES=45`
pub const ENV_PREFIX: &str = "DROWSY";

/// Monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Classifier thresholds
    pub dms: DmsConfig,
    /// Alert aggregation
    pub alert: AlertConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dms: DmsConfig::default(),
            alert: AlertConfig::default(),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load from `path` (format by extension) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        Self::finish(builder.add_source(environment()))
    }

    /// Parse TOML settings without consulting the environment
    pub fn from_toml(contents: &str) -> Result<Self, MonitorError> {
        Self::finish(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, MonitorError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        self.dms.validate()?;
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level, MonitorError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| MonitorError::LogLevel(self.log_level.clone()))
    }
}
