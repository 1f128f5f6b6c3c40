//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// UTC timestamp used for observation receive times.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time as reported by a peripheral.
///
/// GATT date-time fields carry no zone information, so they stay naive.
pub type DeviceTime = NaiveDateTime;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Absolute distance between two device-clock readings.
#[must_use]
pub fn drift(a: DeviceTime, b: DeviceTime) -> TimeDelta {
    (a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_compute_symmetric_drift() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let b = a + TimeDelta::minutes(11);
        assert_eq!(drift(a, b), TimeDelta::minutes(11));
        assert_eq!(drift(b, a), TimeDelta::minutes(11));
    }
}
