//! Pulse Oximeter (PLX) spot-check (`0x2A5E`) and continuous (`0x2A5F`)
//! measurements.
//!
//! Both start with a flags byte followed by SpO2 (%) and pulse rate (bpm)
//! as `SFLOAT`s.
//!
//! Spot-check flags:
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | 0 | timestamp present |
//! | 1 | measurement status (u16) present |
//! | 2 | device and sensor status (u16 + reserved byte) present |
//! | 3 | pulse amplitude index present |
//! | 4 | device clock **not** set |
//!
//! Continuous flags:
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | 0 | SpO2PR-Fast pair present |
//! | 1 | SpO2PR-Slow pair present |
//! | 2 | measurement status (u16) present |
//! | 3 | device and sensor status (u16 + reserved byte) present |
//! | 4 | pulse amplitude index present |

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};
use crate::time::DeviceTime;

/// Read a flagged device/sensor status and skip its trailing reserved byte.
fn sensor_status(cursor: &mut ByteCursor<'_>, present: bool) -> Result<Option<u16>, CursorError> {
    if !present {
        return Ok(None);
    }
    let status = cursor.u16()?;
    cursor.skip(1)?;
    Ok(Some(status))
}

fn optional_u16(cursor: &mut ByteCursor<'_>, present: bool) -> Result<Option<u16>, CursorError> {
    present.then(|| cursor.u16()).transpose()
}

fn optional_sfloat(cursor: &mut ByteCursor<'_>, present: bool) -> Result<Option<f64>, CursorError> {
    present.then(|| cursor.sfloat()).transpose()
}

// ── Spot-check ──────────────────────────────────────────────────

/// A single spot-check reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseOximeterSpot {
    /// Oxygen saturation in percent.
    pub spo2: f64,
    pub pulse_rate: f64,
    pub pulse_amplitude_index: Option<f64>,
    pub timestamp: Option<DeviceTime>,
    pub is_device_clock_set: bool,
    pub measurement_status: Option<u16>,
    pub sensor_status: Option<u16>,
}

impl PulseOximeterSpot {
    const PROFILE: &'static str = "pulse oximeter spot-check";

    /// Decode a PLX spot-check measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when a flagged field is
    /// missing.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(Self::PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let spo2 = cursor.sfloat()?;
        let pulse_rate = cursor.sfloat()?;

        let timestamp = if flags & 0x01 != 0 {
            Some(cursor.datetime()?)
        } else {
            None
        };
        let measurement_status = optional_u16(cursor, flags & 0x02 != 0)?;
        let sensor_status = sensor_status(cursor, flags & 0x04 != 0)?;
        let pulse_amplitude_index = optional_sfloat(cursor, flags & 0x08 != 0)?;

        Ok(Self {
            spo2,
            pulse_rate,
            pulse_amplitude_index,
            timestamp,
            is_device_clock_set: flags & 0x10 == 0,
            measurement_status,
            sensor_status,
        })
    }
}

// ── Continuous ──────────────────────────────────────────────────

/// One sample of the continuous PLX stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseOximeterContinuous {
    /// Oxygen saturation in percent (normal averaging).
    pub spo2: f64,
    pub pulse_rate: f64,
    pub spo2_fast: Option<f64>,
    pub pulse_rate_fast: Option<f64>,
    pub spo2_slow: Option<f64>,
    pub pulse_rate_slow: Option<f64>,
    pub pulse_amplitude_index: Option<f64>,
    pub measurement_status: Option<u16>,
    pub sensor_status: Option<u16>,
}

impl PulseOximeterContinuous {
    const PROFILE: &'static str = "pulse oximeter continuous";

    /// Decode a PLX continuous measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when a flagged field is
    /// missing.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(Self::PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let spo2 = cursor.sfloat()?;
        let pulse_rate = cursor.sfloat()?;

        let fast = flags & 0x01 != 0;
        let spo2_fast = optional_sfloat(cursor, fast)?;
        let pulse_rate_fast = optional_sfloat(cursor, fast)?;

        let slow = flags & 0x02 != 0;
        let spo2_slow = optional_sfloat(cursor, slow)?;
        let pulse_rate_slow = optional_sfloat(cursor, slow)?;

        let measurement_status = optional_u16(cursor, flags & 0x04 != 0)?;
        let sensor_status = sensor_status(cursor, flags & 0x08 != 0)?;
        let pulse_amplitude_index = optional_sfloat(cursor, flags & 0x10 != 0)?;

        Ok(Self {
            spo2,
            pulse_rate,
            spo2_fast,
            pulse_rate_fast,
            spo2_slow,
            pulse_rate_slow,
            pulse_amplitude_index,
            measurement_status,
            sensor_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // SpO2 97 %, pulse 64 bpm
    const VITALS: [u8; 4] = [0x61, 0x00, 0x40, 0x00];

    fn payload(flags: u8, tail: &[u8]) -> Vec<u8> {
        let mut bytes = vec![flags];
        bytes.extend_from_slice(&VITALS);
        bytes.extend_from_slice(tail);
        bytes
    }

    #[test]
    fn should_decode_spot_check_with_clock_set() {
        let spot = PulseOximeterSpot::decode(&payload(0x00, &[])).unwrap();
        assert!((spot.spo2 - 97.0).abs() < f64::EPSILON);
        assert!((spot.pulse_rate - 64.0).abs() < f64::EPSILON);
        assert!(spot.is_device_clock_set);
        assert_eq!(spot.timestamp, None);
        assert_eq!(spot.pulse_amplitude_index, None);
    }

    #[test]
    fn should_report_clock_not_set_when_bit_four_set() {
        let spot = PulseOximeterSpot::decode(&payload(0x10, &[])).unwrap();
        assert!(!spot.is_device_clock_set);
    }

    #[test]
    fn should_skip_reserved_byte_after_spot_sensor_status() {
        let tail = [
            0x20, 0x00, // measurement status
            0x01, 0x00, 0xAA, // sensor status + reserved
            0x2D, 0xF0, // PAI 4.5
        ];
        let spot = PulseOximeterSpot::decode(&payload(0x0E, &tail)).unwrap();
        assert_eq!(spot.measurement_status, Some(0x0020));
        assert_eq!(spot.sensor_status, Some(0x0001));
        assert!((spot.pulse_amplitude_index.unwrap() - 4.5).abs() < 1e-9);
    }

    #[test]
    fn should_decode_spot_timestamp() {
        let spot =
            PulseOximeterSpot::decode(&payload(0x01, &[0xE8, 0x07, 5, 4, 3, 2, 1])).unwrap();
        assert!(spot.timestamp.is_some());
    }

    #[test]
    fn should_decode_continuous_fast_and_slow_pairs() {
        let tail = [
            0x62, 0x00, 0x41, 0x00, // fast 98 / 65
            0x60, 0x00, 0x3F, 0x00, // slow 96 / 63
        ];
        let sample = PulseOximeterContinuous::decode(&payload(0x03, &tail)).unwrap();
        assert_eq!(sample.spo2_fast, Some(98.0));
        assert_eq!(sample.pulse_rate_fast, Some(65.0));
        assert_eq!(sample.spo2_slow, Some(96.0));
        assert_eq!(sample.pulse_rate_slow, Some(63.0));
        assert_eq!(sample.measurement_status, None);
    }

    #[test]
    fn should_decode_continuous_status_and_pai() {
        let tail = [0x08, 0x00, 0x02, 0x00, 0x00, 0x0A, 0x00];
        let sample = PulseOximeterContinuous::decode(&payload(0x1C, &tail)).unwrap();
        assert_eq!(sample.measurement_status, Some(0x0008));
        assert_eq!(sample.sensor_status, Some(0x0002));
        assert_eq!(sample.pulse_amplitude_index, Some(10.0));
    }

    #[test]
    fn should_reject_missing_reserved_byte() {
        let err = PulseOximeterContinuous::decode(&payload(0x08, &[0x02, 0x00])).unwrap_err();
        assert_eq!(err.to_string(), "malformed pulse oximeter continuous payload");
    }

    #[test]
    fn should_reject_truncated_vitals() {
        assert!(PulseOximeterSpot::decode(&[0x00, 0x61]).is_err());
    }
}
