//! Temperature Measurement (`0x2A1C`), Health Thermometer service.
//!
//! | Flag bit | Meaning |
//! |----------|---------|
//! | 0 | unit: 0 = °C, 1 = °F |
//! | 1 | timestamp present |
//! | 2 | temperature type (u8) present |
//!
//! The value itself is an IEEE-11073 32-bit `FLOAT`.

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};
use crate::measurement::Unit;
use crate::time::DeviceTime;

const PROFILE: &str = "temperature";

/// Body site of the reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureType {
    #[default]
    Unknown,
    Armpit,
    Body,
    Ear,
    Finger,
    GastroIntestinalTract,
    Mouth,
    Rectum,
    Toe,
    Tympanum,
}

impl From<u8> for TemperatureType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Armpit,
            2 => Self::Body,
            3 => Self::Ear,
            4 => Self::Finger,
            5 => Self::GastroIntestinalTract,
            6 => Self::Mouth,
            7 => Self::Rectum,
            8 => Self::Toe,
            9 => Self::Tympanum,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    pub value: f64,
    /// [`Unit::Celsius`] or [`Unit::Fahrenheit`].
    pub unit: Unit,
    pub timestamp: Option<DeviceTime>,
    pub temperature_type: TemperatureType,
}

impl Temperature {
    /// Decode a temperature measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when the value or a
    /// flagged field is missing.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let unit = if flags & 0x01 == 0 {
            Unit::Celsius
        } else {
            Unit::Fahrenheit
        };
        let value = cursor.float32()?;
        let timestamp = if flags & 0x02 != 0 {
            Some(cursor.datetime()?)
        } else {
            None
        };
        let temperature_type = if flags & 0x04 != 0 {
            TemperatureType::from(cursor.u8()?)
        } else {
            TemperatureType::Unknown
        };

        Ok(Self {
            value,
            unit,
            timestamp,
            temperature_type,
        })
    }
}
