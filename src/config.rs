//! Daemon configuration.

use std::path::Path;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::layout::Dimensions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("invalid dimensions: {width} x {height}")]
    InvalidDimensions { width: usize, height: usize },
}

fn default_poll_interval() -> u64 {
    1000
}

/// A device to register at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeviceSetup {
    #[validate(range(min = 1))]
    pub device_number: u32,
    #[validate(length(min = 1))]
    pub serial_number: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Connection poll interval, in milliseconds
    #[validate(range(min = 1))]
    pub poll_interval_ms: u64,
    pub dimensions: Dimensions,
    pub devices: Vec<DeviceSetup>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            dimensions: Dimensions::PCIE_BOARD,
            devices: Vec::new(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&contents)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        for device in &self.devices {
            device.validate()?;
        }

        if self.dimensions.width == 0 || self.dimensions.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Serialize back to TOML, for `--dump-config`
    pub fn to_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
