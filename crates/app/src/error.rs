//! Errors crossing the port boundaries.
//!
//! Adapters map their native failures into [`GattError`]; sinks report
//! [`SinkError`]. Neither ever escapes a peripheral session: the session
//! logs them and carries on.

use uuid::Uuid;

/// Boxed error from an adapter's underlying stack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a GATT or link-level operation.
#[derive(Debug, thiserror::Error)]
pub enum GattError {
    /// The peripheral does not expose the requested characteristic.
    #[error("characteristic {characteristic} of service {service} is not available")]
    CharacteristicUnavailable { service: Uuid, characteristic: Uuid },

    /// Connecting (or auto-connecting) to a peripheral failed.
    #[error("failed to connect to {address}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: BoxError,
    },

    /// A characteristic write was rejected or never acknowledged.
    #[error("failed to write characteristic {characteristic}")]
    WriteFailed {
        characteristic: Uuid,
        #[source]
        source: BoxError,
    },

    /// A characteristic read failed.
    #[error("failed to read characteristic {characteristic}")]
    ReadFailed {
        characteristic: Uuid,
        #[source]
        source: BoxError,
    },

    /// The BLE stack does not offer this operation.
    #[error("{0} is not supported by this BLE stack")]
    Unsupported(&'static str),

    /// No peripheral matched a scan target or identifier.
    #[error("peripheral {0} not found")]
    NotFound(String),

    /// Any other transport failure.
    #[error("BLE transport error")]
    Transport(#[source] BoxError),
}

/// Failure to hand an observation to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The receiving side has gone away.
    #[error("sink closed")]
    Closed,

    #[error("sink failed")]
    Failed(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use wearsync_domain::profile::ProfileKind;

    #[test]
    fn should_display_characteristic_unavailable() {
        let kind = ProfileKind::HeartRate;
        let err = GattError::CharacteristicUnavailable {
            service: kind.service_uuid(),
            characteristic: kind.characteristic_uuid(),
        };
        assert_eq!(
            err.to_string(),
            "characteristic 00002a37-0000-1000-8000-00805f9b34fb of service \
             0000180d-0000-1000-8000-00805f9b34fb is not available"
        );
    }

    #[test]
    fn should_keep_source_of_connection_failure() {
        let err = GattError::ConnectionFailed {
            address: "AA:BB:CC:DD:EE:FF".to_owned(),
            source: "link timeout".into(),
        };
        assert_eq!(err.to_string(), "failed to connect to AA:BB:CC:DD:EE:FF");
        assert_eq!(err.source().unwrap().to_string(), "link timeout");
    }

    #[test]
    fn should_display_unsupported_operation() {
        let err = GattError::Unsupported("MTU request");
        assert_eq!(err.to_string(), "MTU request is not supported by this BLE stack");
    }

    #[test]
    fn should_display_sink_closed() {
        assert_eq!(SinkError::Closed.to_string(), "sink closed");
    }
}
