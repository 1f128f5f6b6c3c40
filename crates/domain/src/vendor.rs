//! Vendor-specific characteristics outside the SIG profiles.

pub mod contour {
    //! Ascensia Contour glucose meters.
    //!
    //! The meter refuses to transfer records until its proprietary clock
    //! characteristic has been written. Payload:
    //!
    //! | Bytes | Field |
    //! |-------|-------|
    //! | 0 | `0x01` (set time) |
    //! | 1–2 | UTC year (u16 LE) |
    //! | 3–7 | UTC month, day, hour, minute, second |
    //! | 8–9 | host UTC offset in minutes (s16 LE) |

    use chrono::{Datelike, Timelike};
    use uuid::Uuid;

    use crate::time::Timestamp;

    pub const CLOCK_SERVICE: Uuid = Uuid::from_u128(0x0000_0000_0002_11E2_9E96_0800_200C_9A66);
    pub const CLOCK_CHARACTERISTIC: Uuid =
        Uuid::from_u128(0x0000_1026_0002_11E2_9E96_0800_200C_9A66);

    const SET_TIME: u8 = 0x01;

    /// Build the clock write for `now`, announcing the host's UTC offset.
    #[must_use]
    pub fn clock_payload(now: Timestamp, utc_offset_minutes: i16) -> [u8; 10] {
        let year = u16::try_from(now.year()).unwrap_or(u16::MAX).to_le_bytes();
        let offset = utc_offset_minutes.to_le_bytes();
        let field = |value: u32| u8::try_from(value).unwrap_or(u8::MAX);
        [
            SET_TIME,
            year[0],
            year[1],
            field(now.month()),
            field(now.day()),
            field(now.hour()),
            field(now.minute()),
            field(now.second()),
            offset[0],
            offset[1],
        ]
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{TimeZone, Utc};

        #[test]
        fn should_encode_utc_time_and_offset() {
            let now = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 45).unwrap();
            assert_eq!(
                clock_payload(now, 60),
                [0x01, 0xE8, 0x07, 3, 15, 8, 30, 45, 0x3C, 0x00]
            );
        }

        #[test]
        fn should_encode_negative_offset() {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let payload = clock_payload(now, -300);
            assert_eq!(&payload[8..], &[0xD4, 0xFE]);
        }

        #[test]
        fn should_use_vendor_uuids() {
            assert_eq!(
                CLOCK_CHARACTERISTIC.to_string(),
                "00001026-0002-11e2-9e96-0800200c9a66"
            );
            assert_eq!(
                CLOCK_SERVICE.to_string(),
                "00000000-0002-11e2-9e96-0800200c9a66"
            );
        }
    }
}
