//! Device Information service (`0x180A`) strings.
//!
//! Read once per session for diagnostics only; they never become
//! measurements.

use uuid::Uuid;

use crate::profile::sig_uuid;

pub const DEVICE_INFORMATION_SERVICE: Uuid = sig_uuid(0x180A);
pub const MANUFACTURER_NAME: Uuid = sig_uuid(0x2A29);
pub const MODEL_NUMBER: Uuid = sig_uuid(0x2A24);

/// Decode a UTF-8 string characteristic.
///
/// Invalid sequences are replaced rather than rejected and trailing NUL
/// padding, which several vendors send, is stripped.
#[must_use]
pub fn decode_string(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches('\0')
        .to_owned()
}
