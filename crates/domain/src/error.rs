//! Error types raised while decoding characteristic payloads.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.
//! The domain only knows about malformed bytes; IO and link failures are
//! described by the `app` ports.

/// Low-level failure of a [`ByteCursor`](crate::cursor::ByteCursor) read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The read would run past the end of the buffer.
    #[error("reading {width} bytes at offset {offset} overruns a {len}-byte buffer")]
    OutOfRange {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes the read needed.
        width: usize,
        /// Total buffer length.
        len: usize,
    },

    /// A date-time field holds a value outside the calendar.
    #[error("invalid date-time {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
    InvalidDateTime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },
}

/// Failure to turn a characteristic value into a measurement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The flags byte announces fields the buffer does not contain, or a
    /// field holds an impossible value.
    #[error("malformed {profile} payload")]
    MalformedPayload {
        /// Human readable profile name (e.g. `"heart rate"`).
        profile: &'static str,
        /// What went wrong while reading.
        #[source]
        source: CursorError,
    },
}

impl DecodeError {
    /// Build a closure that wraps a [`CursorError`] for the given profile.
    ///
    /// Meant for `map_err` at the end of a decoder body.
    pub(crate) fn malformed(profile: &'static str) -> impl Fn(CursorError) -> Self {
        move |source| Self::MalformedPayload { profile, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_out_of_range_error() {
        let err = CursorError::OutOfRange {
            offset: 3,
            width: 2,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "reading 2 bytes at offset 3 overruns a 4-byte buffer"
        );
    }

    #[test]
    fn should_display_invalid_date_time() {
        let err = CursorError::InvalidDateTime {
            year: 2024,
            month: 13,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert_eq!(err.to_string(), "invalid date-time 2024-13-01 00:00:00");
    }

    #[test]
    fn should_expose_cursor_error_as_source() {
        let err = DecodeError::malformed("battery")(CursorError::OutOfRange {
            offset: 0,
            width: 1,
            len: 0,
        });
        assert_eq!(err.to_string(), "malformed battery payload");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("overruns"));
    }
}
