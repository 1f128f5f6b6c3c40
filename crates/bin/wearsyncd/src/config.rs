//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `wearsync.toml` in the working directory. Every field except
//! the device target has a sensible default, so the file is optional when
//! the target comes from the environment. Environment variables take
//! precedence over file values.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use wearsync_adapter_ble::BleConfig;
use wearsync_app::connection_manager::ConnectionOptions;
use wearsync_app::ports::DeviceTarget;
use wearsync_app::reconnect::DEFAULT_RECONNECT_DELAY;
use wearsync_app::session::{DEFAULT_MTU, SessionOptions};

/// ATT MTU bounds from the Bluetooth Core specification.
const MTU_RANGE: RangeInclusive<u16> = 23..=517;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which wearable to keep connected.
    pub device: DeviceConfig,
    /// Per-connection tunables.
    pub session: SessionConfig,
    /// Host adapter settings.
    pub ble: BleConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Where observations go besides the log.
    pub sink: SinkConfig,
}

/// Target selection. Both fields must match when both are set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hardware address, e.g. `C0:26:DA:01:02:03`.
    pub address: Option<String>,
    /// Substring of the advertised name, e.g. `BLEsmart_`.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// MTU requested after connecting.
    pub mtu: u16,
    /// Seconds to wait after a disconnect before reconnecting.
    pub reconnect_delay_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Append every observation to this file as one JSON object per line.
    pub jsonl_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `wearsync.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("wearsync.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WEARSYNC_ADDRESS") {
            self.device.address = Some(val);
        }
        if let Some(val) = var("WEARSYNC_NAME") {
            self.device.name = Some(val);
        }
        if let Some(val) = var("WEARSYNC_JSONL") {
            self.sink.jsonl_path = Some(PathBuf::from(val));
        }
        if let Some(val) = var("WEARSYNC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.target().is_specified() {
            return Err(ConfigError::Validation(
                "device address or name must be set".to_string(),
            ));
        }
        if !MTU_RANGE.contains(&self.session.mtu) {
            return Err(ConfigError::Validation(format!(
                "mtu must be between {} and {}",
                MTU_RANGE.start(),
                MTU_RANGE.end()
            )));
        }
        if self.session.reconnect_delay_secs == 0 {
            return Err(ConfigError::Validation(
                "reconnect_delay_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The peripheral to scan for. Empty strings count as unset.
    #[must_use]
    pub fn target(&self) -> DeviceTarget {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        DeviceTarget {
            address: non_empty(&self.device.address),
            name: non_empty(&self.device.name),
        }
    }

    #[must_use]
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            session: SessionOptions {
                mtu: self.session.mtu,
            },
            reconnect_delay: Duration::from_secs(self.session.reconnect_delay_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY.as_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wearsyncd=info,wearsync_app=info,wearsync_adapter_ble=info,btleplug=warn"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
