//! BLE adapter error types.

use wearsync_app::error::GattError;

/// Errors specific to the btleplug adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// A btleplug operation failed.
    #[error("BLE stack error")]
    Btle(#[from] btleplug::Error),

    /// The target did not advertise before the scan timeout.
    #[error("no matching peripheral seen within {secs}s")]
    ScanTimeout { secs: u64 },

    /// A connection attempt did not complete in time.
    #[error("connection to {address} timed out")]
    ConnectTimeout { address: String },
}

impl BleError {
    /// Convert into a [`GattError`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_gatt(self) -> GattError {
        match self {
            Self::ScanTimeout { .. } => GattError::NotFound(self.to_string()),
            Self::ConnectTimeout { address } => {
                let source = Box::new(Self::ConnectTimeout {
                    address: address.clone(),
                });
                GattError::ConnectionFailed { address, source }
            }
            Self::Btle(btleplug::Error::NotSupported(_)) => {
                GattError::Unsupported("requested operation")
            }
            other => GattError::Transport(Box::new(other)),
        }
    }
}

impl From<BleError> for GattError {
    fn from(err: BleError) -> Self {
        err.into_gatt()
    }
}
