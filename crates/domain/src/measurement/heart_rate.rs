//! Heart Rate Measurement (`0x2A37`).
//!
//! | Flag bit | Meaning |
//! |----------|---------|
//! | 0 | heart rate value is u16 (else u8) |
//! | 1–2 | sensor contact status |
//! | 3 | energy expended (u16, kJ) present |
//! | 4 | RR intervals present (u16 each, 1/1024 s) |
//!
//! RR intervals fill the rest of the payload; they are read until the
//! cursor is exhausted rather than by count.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};

const PROFILE: &str = "heart rate";

const FLAG_PULSE_U16: u8 = 0x01;
const FLAG_ENERGY_EXPENDED: u8 = 0x08;
const FLAG_RR_INTERVALS: u8 = 0x10;

/// Skin contact detection as reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorContact {
    NotSupported,
    SupportedNoContact,
    SupportedAndContact,
}

impl SensorContact {
    fn from_flags(flags: u8) -> Self {
        match (flags & 0x06) >> 1 {
            2 => Self::SupportedNoContact,
            3 => Self::SupportedAndContact,
            _ => Self::NotSupported,
        }
    }
}

/// One heart rate notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartRate {
    /// Beats per minute.
    pub pulse: u16,
    pub sensor_contact: SensorContact,
    /// Accumulated energy expended in kilojoules.
    pub energy_expended: Option<u16>,
    /// Beat-to-beat intervals in milliseconds, oldest first.
    pub rr_intervals: Vec<u32>,
}

impl HeartRate {
    /// Decode a heart rate measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when a field announced by
    /// the flags is missing, including a dangling odd RR byte.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;

        let pulse = if flags & FLAG_PULSE_U16 == 0 {
            u16::from(cursor.u8()?)
        } else {
            cursor.u16()?
        };
        let energy_expended = if flags & FLAG_ENERGY_EXPENDED != 0 {
            Some(cursor.u16()?)
        } else {
            None
        };

        let mut rr_intervals = Vec::new();
        if flags & FLAG_RR_INTERVALS != 0 {
            while !cursor.is_empty() {
                rr_intervals.push(ticks_to_millis(cursor.u16()?));
            }
        }

        Ok(Self {
            pulse,
            sensor_contact: SensorContact::from_flags(flags),
            energy_expended,
            rr_intervals,
        })
    }
}

/// Convert 1/1024 s ticks to milliseconds, rounding to nearest.
fn ticks_to_millis(ticks: u16) -> u32 {
    (u32::from(ticks) * 1000 + 512) / 1024
}
