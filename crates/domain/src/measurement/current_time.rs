//! Current Time (`0x2A2B`), Current Time service.
//!
//! | Bytes | Field |
//! |-------|-------|
//! | 0–6 | date-time |
//! | 7 | day of week (1 = Monday … 7 = Sunday, 0 = unknown) |
//! | 8 | fractions of a second, 1/256 s |
//! | 9 | adjust reason bitfield |
//!
//! Only the date-time is mandatory when decoding; many devices send the
//! bare 7 bytes. Writes always carry all 10.

use chrono::{Datelike, Timelike, Weekday};
use serde::Serialize;

use crate::cursor::{ByteCursor, DATE_TIME_LEN};
use crate::error::{CursorError, DecodeError};
use crate::time::DeviceTime;

const PROFILE: &str = "current time";

/// Length of a full Current Time value.
pub const CURRENT_TIME_LEN: usize = DATE_TIME_LEN + 3;

/// Adjust reason sent with host-initiated writes: manual time update.
pub const ADJUST_REASON_MANUAL: u8 = 0x01;

/// The peripheral's wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTime {
    /// Local time on the device; carries no zone.
    pub time: DeviceTime,
    pub day_of_week: Option<Weekday>,
    pub fractions256: Option<u8>,
    pub adjust_reason: Option<u8>,
}

impl CurrentTime {
    /// Decode a Current Time value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when the date-time is
    /// truncated or invalid.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let time = cursor.datetime()?;
        let day_of_week = if cursor.is_empty() {
            None
        } else {
            weekday_from_u8(cursor.u8()?)
        };
        let fractions256 = if cursor.is_empty() {
            None
        } else {
            Some(cursor.u8()?)
        };
        let adjust_reason = if cursor.is_empty() {
            None
        } else {
            Some(cursor.u8()?)
        };

        Ok(Self {
            time,
            day_of_week,
            fractions256,
            adjust_reason,
        })
    }

    /// Build the payload that sets the device clock to `now`.
    ///
    /// Sub-second precision is dropped (fractions = 0) and the adjust
    /// reason is [`ADJUST_REASON_MANUAL`]. Years past `u16::MAX` saturate.
    #[must_use]
    pub fn encode(now: DeviceTime) -> [u8; CURRENT_TIME_LEN] {
        let year = u16::try_from(now.year()).unwrap_or(u16::MAX).to_le_bytes();
        [
            year[0],
            year[1],
            to_u8(now.month()),
            to_u8(now.day()),
            to_u8(now.hour()),
            to_u8(now.minute()),
            to_u8(now.second()),
            to_u8(now.weekday().number_from_monday()),
            0,
            ADJUST_REASON_MANUAL,
        ]
    }
}

// calendar components are at most 60, so this never saturates in practice
fn to_u8(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

fn weekday_from_u8(value: u8) -> Option<Weekday> {
    match value {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> DeviceTime {
        // a Friday
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(8, 30, 45)
            .unwrap()
    }

    #[test]
    fn should_decode_bare_date_time() {
        let ct = CurrentTime::decode(&[0xE8, 0x07, 3, 15, 8, 30, 45]).unwrap();
        assert_eq!(ct.time, sample());
        assert_eq!(ct.day_of_week, None);
        assert_eq!(ct.fractions256, None);
        assert_eq!(ct.adjust_reason, None);
    }

    #[test]
    fn should_decode_full_value() {
        let ct = CurrentTime::decode(&[0xE8, 0x07, 3, 15, 8, 30, 45, 5, 128, 0x02]).unwrap();
        assert_eq!(ct.day_of_week, Some(Weekday::Fri));
        assert_eq!(ct.fractions256, Some(128));
        assert_eq!(ct.adjust_reason, Some(0x02));
    }

    #[test]
    fn should_encode_ten_byte_write_payload() {
        assert_eq!(
            CurrentTime::encode(sample()),
            [0xE8, 0x07, 3, 15, 8, 30, 45, 5, 0, ADJUST_REASON_MANUAL]
        );
    }

    #[test]
    fn should_decode_what_it_encodes() {
        let ct = CurrentTime::decode(&CurrentTime::encode(sample())).unwrap();
        assert_eq!(ct.time, sample());
        assert_eq!(ct.day_of_week, Some(Weekday::Fri));
    }

    #[test]
    fn should_treat_day_zero_as_unknown() {
        let ct = CurrentTime::decode(&[0xE8, 0x07, 3, 15, 8, 30, 45, 0]).unwrap();
        assert_eq!(ct.day_of_week, None);
    }

    #[test]
    fn should_reject_invalid_date() {
        assert!(CurrentTime::decode(&[0xE8, 0x07, 13, 1, 0, 0, 0]).is_err());
    }
}
