//! Weight Measurement (`0x2A9D`), Weight Scale service.
//!
//! | Flag bit | Meaning |
//! |----------|---------|
//! | 0 | unit: 0 = SI (kg, m), 1 = imperial (lb, in) |
//! | 1 | timestamp present |
//! | 2 | user id (u8) present |
//! | 3 | BMI and height present |
//!
//! | Field | Resolution (SI) | Resolution (imperial) |
//! |-------|-----------------|-----------------------|
//! | weight (u16) | 0.005 kg | 0.01 lb |
//! | BMI (u16) | 0.1 | 0.1 |
//! | height (u16) | 0.001 m | 0.1 in |

use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};
use crate::measurement::Unit;
use crate::time::DeviceTime;

const PROFILE: &str = "weight";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weight {
    /// Rounded to two decimals.
    pub weight: f64,
    /// [`Unit::Kilogram`] or [`Unit::Pound`].
    pub unit: Unit,
    pub timestamp: Option<DeviceTime>,
    pub user_id: Option<u8>,
    pub bmi: Option<f64>,
    /// Metres for SI readings, inches for imperial ones.
    pub height: Option<f64>,
    /// [`Unit::Metre`] or [`Unit::Inch`].
    pub height_unit: Unit,
}

impl Weight {
    /// Decode a weight measurement value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when the weight or a
    /// flagged field is missing.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let imperial = flags & 0x01 != 0;
        let (unit, height_unit) = if imperial {
            (Unit::Pound, Unit::Inch)
        } else {
            (Unit::Kilogram, Unit::Metre)
        };

        // integer divisors keep 10000 → 50.00 kg exact
        let raw = f64::from(cursor.u16()?);
        let weight = if imperial { raw / 100.0 } else { raw / 200.0 };

        let timestamp = if flags & 0x02 != 0 {
            Some(cursor.datetime()?)
        } else {
            None
        };
        let user_id = if flags & 0x04 != 0 {
            Some(cursor.u8()?)
        } else {
            None
        };
        let (bmi, height) = if flags & 0x08 != 0 {
            let bmi = f64::from(cursor.u16()?) / 10.0;
            let height = f64::from(cursor.u16()?);
            let height = if imperial { height / 10.0 } else { height / 1000.0 };
            (Some(bmi), Some(height))
        } else {
            (None, None)
        };

        Ok(Self {
            weight: round_to_hundredths(weight),
            unit,
            timestamp,
            user_id,
            bmi,
            height,
            height_unit,
        })
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
