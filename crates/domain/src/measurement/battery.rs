//! Battery Level (`0x2A19`).

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

const PROFILE: &str = "battery level";

/// Remaining charge reported by the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryLevel {
    /// Charge in percent (0–100).
    pub percent: u8,
}

impl BatteryLevel {
    /// Decode a single-byte battery level. Trailing bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] for an empty value.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        let percent = ByteCursor::new(value)
            .u8()
            .map_err(DecodeError::malformed(PROFILE))?;
        Ok(Self { percent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_percent() {
        assert_eq!(
            BatteryLevel::decode(&[0x57]).unwrap(),
            BatteryLevel { percent: 87 }
        );
    }

    #[test]
    fn should_reject_empty_value() {
        let err = BatteryLevel::decode(&[]).unwrap_err();
        assert_eq!(err.to_string(), "malformed battery level payload");
    }
}
