//! Central port — scanning, connecting and link-state tracking.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio_stream::Stream;

use crate::error::GattError;
use crate::ports::gatt::GattPeripheral;

/// Link state of a peripheral as seen by the central.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Disconnected => "disconnected",
        })
    }
}

/// A link state change, emitted for every peripheral the central manages.
#[derive(Debug, Clone)]
pub struct ConnectionEvent<P> {
    pub peripheral: P,
    pub state: ConnectionState,
}

pub type ConnectionEventStream<P> = Pin<Box<dyn Stream<Item = ConnectionEvent<P>> + Send>>;

/// Which peripheral to look for.
///
/// When both fields are set, both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTarget {
    /// Hardware address, compared case-insensitively.
    pub address: Option<String>,
    /// Substring of the advertised local name.
    pub name: Option<String>,
}

impl DeviceTarget {
    #[must_use]
    pub fn by_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            name: None,
        }
    }

    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            address: None,
            name: Some(name.into()),
        }
    }

    /// `false` for a target with neither field set; such a target would
    /// connect to the first peripheral in range.
    #[must_use]
    pub fn is_specified(&self) -> bool {
        self.address.is_some() || self.name.is_some()
    }

    /// Does an advertisement with this address and name match?
    #[must_use]
    pub fn matches(&self, address: &str, name: Option<&str>) -> bool {
        if !self.is_specified() {
            return false;
        }
        let address_ok = self
            .address
            .as_deref()
            .is_none_or(|wanted| wanted.eq_ignore_ascii_case(address));
        let name_ok = match (self.name.as_deref(), name) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => actual.contains(wanted),
            (Some(_), None) => false,
        };
        address_ok && name_ok
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.address, &self.name) {
            (Some(address), Some(name)) => write!(f, "{address} ({name})"),
            (Some(address), None) => f.write_str(address),
            (None, Some(name)) => write!(f, "name containing {name:?}"),
            (None, None) => f.write_str("<unspecified>"),
        }
    }
}

/// The local BLE central.
///
/// `connect` and `auto_connect` only *request* a link; success is
/// reported through [`connection_events`](Self::connection_events) as a
/// [`ConnectionState::Connected`] event once services are discovered.
pub trait ScanGateway: Send + Sync {
    type Peripheral: GattPeripheral + Clone + 'static;

    /// Scan until a peripheral matching `target` is seen, then stop the
    /// scan and return it.
    ///
    /// # Errors
    ///
    /// [`GattError::NotFound`] when the scan times out, or a transport
    /// error when scanning cannot start.
    fn scan_for(
        &self,
        target: &DeviceTarget,
    ) -> impl Future<Output = Result<Self::Peripheral, GattError>> + Send;

    /// # Errors
    ///
    /// Returns a transport error when the adapter rejects the request.
    fn stop_scan(&self) -> impl Future<Output = Result<(), GattError>> + Send;

    /// Connect directly to a peripheral that is known to be in range.
    ///
    /// # Errors
    ///
    /// [`GattError::ConnectionFailed`] when the link cannot be opened.
    fn connect(
        &self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), GattError>> + Send;

    /// Reconnect to a previously known peripheral.
    ///
    /// # Errors
    ///
    /// [`GattError::ConnectionFailed`] when the request is rejected.
    fn auto_connect(
        &self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = Result<(), GattError>> + Send;

    fn connection_state(
        &self,
        peripheral: &Self::Peripheral,
    ) -> impl Future<Output = ConnectionState> + Send;

    /// Subscribe to link state changes. Only changes after the call are
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the adapter cannot report events.
    fn connection_events(
        &self,
    ) -> impl Future<Output = Result<ConnectionEventStream<Self::Peripheral>, GattError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_address_case_insensitively() {
        let target = DeviceTarget::by_address("aa:bb:cc:dd:ee:ff");
        assert!(target.matches("AA:BB:CC:DD:EE:FF", None));
        assert!(!target.matches("AA:BB:CC:DD:EE:00", Some("anything")));
    }

    #[test]
    fn should_match_name_substring() {
        let target = DeviceTarget::by_name("Polar H10");
        assert!(target.matches("00:00:00:00:00:01", Some("Polar H10 7A1B2C3D")));
        assert!(!target.matches("00:00:00:00:00:01", Some("Wahoo TICKR")));
        assert!(!target.matches("00:00:00:00:00:01", None));
    }

    #[test]
    fn should_require_both_fields_when_set() {
        let target = DeviceTarget {
            address: Some("AA:BB:CC:DD:EE:FF".to_owned()),
            name: Some("BLEsmart_".to_owned()),
        };
        assert!(target.matches("AA:BB:CC:DD:EE:FF", Some("BLEsmart_00000116")));
        assert!(!target.matches("AA:BB:CC:DD:EE:FF", Some("Contour7830")));
    }

    #[test]
    fn should_never_match_unspecified_target() {
        let target = DeviceTarget::default();
        assert!(!target.is_specified());
        assert!(!target.matches("AA:BB:CC:DD:EE:FF", Some("x")));
    }

    #[test]
    fn should_display_target() {
        assert_eq!(DeviceTarget::by_address("AA").to_string(), "AA");
        assert_eq!(
            DeviceTarget::by_name("H10").to_string(),
            "name containing \"H10\""
        );
    }
}
