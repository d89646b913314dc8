//! Driver configuration using Figment.
//!
//! Configuration is loaded from a TOML file plus environment variables
//! prefixed with `I2C_ADC_`. Each `[[devices]]` entry describes one ADC on
//! the bus; only the model name is mandatory, everything else has the
//! device's factory defaults:
//!
//! ```toml
//! [[devices]]
//! id = "bed_adc"
//! sensor_id = "MCP3421"
//! # i2c_address = 0x68   # model default when omitted
//! resolution = 16        # bits, default 12
//! gain = 1.0             # default 1.0
//! channel = 1            # 1-based, default 1
//! # rate = 240.0         # S/s, family default when omitted
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AdcError;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    Load(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Invalid device configuration: {0}")]
    InvalidDevice(#[from] AdcError),
}

/// Top-level driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdcConfig {
    /// Configured ADC devices.
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

/// One ADC on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Unique device identifier.
    pub id: String,
    /// Model name, e.g. "MCP3421" or "ADS1015" (case-insensitive).
    pub sensor_id: String,
    /// Bus address; the model's factory default when omitted.
    #[serde(default)]
    pub i2c_address: Option<u8>,
    /// Default resolution in bits.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    /// Default PGA gain factor.
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// Default input channel, 1-based as presented to users.
    #[serde(default = "default_channel")]
    pub channel: u8,
    /// Default rate in samples per second; the family default when omitted.
    #[serde(default)]
    pub rate: Option<f64>,
}

fn default_resolution() -> u32 {
    12
}

fn default_gain() -> f64 {
    1.0
}

fn default_channel() -> u8 {
    1
}

impl AdcConfig {
    /// Load from `i2c_adc.toml` in the working directory plus `I2C_ADC_`
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("i2c_adc.toml")
    }

    /// Load from an explicit TOML file plus environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: AdcConfig = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("I2C_ADC_"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a device entry by identifier.
    pub fn device(&self, id: &str) -> Option<&DeviceEntry> {
        self.devices.iter().find(|entry| entry.id == id)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, entry) in self.devices.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "devices[{index}]: id must not be empty"
                )));
            }
            if self.devices[..index].iter().any(|other| other.id == entry.id) {
                return Err(ConfigError::Validation(format!(
                    "duplicate device id '{}'",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}
