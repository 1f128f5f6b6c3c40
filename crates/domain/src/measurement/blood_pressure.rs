//! Blood Pressure Measurement (`0x2A35`).
//!
//! | Flag bit | Meaning |
//! |----------|---------|
//! | 0 | unit: 1 = mmHg, 0 = kPa |
//! | 1 | timestamp present |
//! | 2 | pulse rate present |
//! | 3 | user id present |
//! | 4 | measurement status present |
//!
//! Systolic, diastolic and mean arterial pressure are always present, in
//! that order, followed by the optional fields in flag order.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};
use crate::measurement::Unit;
use crate::time::DeviceTime;

const PROFILE: &str = "blood pressure";

const FLAG_MMHG: u8 = 0x01;
const FLAG_TIMESTAMP: u8 = 0x02;
const FLAG_PULSE_RATE: u8 = 0x04;
const FLAG_USER_ID: u8 = 0x08;
const FLAG_STATUS: u8 = 0x10;

/// Measurement status bitfield; every bit is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct BloodPressureStatus {
    pub body_movement_detected: bool,
    pub cuff_too_loose: bool,
    pub irregular_pulse_detected: bool,
    pub pulse_out_of_range: bool,
    pub improper_measurement_position: bool,
}

impl BloodPressureStatus {
    /// Split the raw 16-bit status field.
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        Self {
            body_movement_detected: bits & 0x0001 != 0,
            cuff_too_loose: bits & 0x0002 != 0,
            irregular_pulse_detected: bits & 0x0004 != 0,
            pulse_out_of_range: bits & 0x0008 != 0,
            improper_measurement_position: bits & 0x0020 != 0,
        }
    }
}

/// One cuff reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
    pub mean_arterial_pressure: f64,
    /// Either [`Unit::MillimetreOfMercury`] or [`Unit::Kilopascal`].
    pub unit: Unit,
    pub timestamp: Option<DeviceTime>,
    /// Beats per minute.
    pub pulse_rate: Option<f64>,
    pub user_id: Option<u8>,
    pub status: Option<BloodPressureStatus>,
}

impl BloodPressure {
    /// Decode a blood pressure measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when a field announced by
    /// the flags is missing or the timestamp is not a calendar date.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let unit = if flags & FLAG_MMHG != 0 {
            Unit::MillimetreOfMercury
        } else {
            Unit::Kilopascal
        };

        let systolic = cursor.sfloat()?;
        let diastolic = cursor.sfloat()?;
        let mean_arterial_pressure = cursor.sfloat()?;

        let timestamp = if flags & FLAG_TIMESTAMP != 0 {
            Some(cursor.datetime()?)
        } else {
            None
        };
        let pulse_rate = if flags & FLAG_PULSE_RATE != 0 {
            Some(cursor.sfloat()?)
        } else {
            None
        };
        let user_id = if flags & FLAG_USER_ID != 0 {
            Some(cursor.u8()?)
        } else {
            None
        };
        let status = if flags & FLAG_STATUS != 0 {
            Some(BloodPressureStatus::from_bits(cursor.u16()?))
        } else {
            None
        };

        Ok(Self {
            systolic,
            diastolic,
            mean_arterial_pressure,
            unit,
            timestamp,
            pulse_rate,
            user_id,
            status,
        })
    }
}
