//! BLE adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the btleplug central.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// Which host adapter to use, in the order the OS lists them.
    pub adapter_index: usize,
    /// Give up scanning for the target after this many seconds.
    ///
    /// `0` scans until the target shows up.
    pub scan_timeout_secs: u64,
    /// Abort a connection attempt after this many seconds.
    pub connect_timeout_secs: u64,
}

impl BleConfig {
    #[must_use]
    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan_timeout_secs > 0).then(|| Duration::from_secs(self.scan_timeout_secs))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            adapter_index: 0,
            scan_timeout_secs: 0,
            connect_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: BleConfig = toml::from_str("adapter_index = 1").unwrap();
        assert_eq!(config.adapter_index, 1);
        assert_eq!(config.scan_timeout_secs, 0);
        assert_eq!(config.connect_timeout_secs, 30);
    }

    #[test]
    fn should_scan_forever_when_timeout_is_zero() {
        assert_eq!(BleConfig::default().scan_timeout(), None);
    }

    #[test]
    fn should_convert_timeouts_to_durations() {
        let config: BleConfig =
            toml::from_str("scan_timeout_secs = 20\nconnect_timeout_secs = 5").unwrap();
        assert_eq!(config.scan_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }
}
