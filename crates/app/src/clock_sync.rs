//! Rules for setting a peripheral's clock.
//!
//! Most devices accept a Current Time write right after connecting. Omron
//! `BLEsmart_` cuffs are different: an unconditional write on every
//! connect upsets them, so their clock is only corrected when the first
//! Current Time notification shows it has drifted by more than
//! [`MAX_CLOCK_DRIFT_MINUTES`].

use chrono::{Local, TimeDelta};

use wearsync_domain::time::{self, DeviceTime};

/// Advertised-name fragment identifying Omron cuffs.
pub const OMRON_NAME_MARKER: &str = "BLEsmart_";

/// Drift tolerated on Omron devices before their clock is rewritten.
pub const MAX_CLOCK_DRIFT_MINUTES: i64 = 10;

/// `true` when the advertised name marks an Omron device.
#[must_use]
pub fn is_omron(name: Option<&str>) -> bool {
    name.is_some_and(|name| name.contains(OMRON_NAME_MARKER))
}

/// `true` when `device` differs from `host` by strictly more than the
/// tolerated drift.
#[must_use]
pub fn needs_correction(device: DeviceTime, host: DeviceTime) -> bool {
    time::drift(device, host) > TimeDelta::minutes(MAX_CLOCK_DRIFT_MINUTES)
}

/// Host wall-clock time, the reference peripherals display.
#[must_use]
pub fn host_wall_clock() -> DeviceTime {
    Local::now().naive_local()
}

/// Host offset from UTC in minutes (e.g. `60` for CET, `120` for CEST).
///
/// This is the offset in effect now, daylight saving included, so the
/// device shows the same time as the host's own clock.
#[must_use]
pub fn host_utc_offset_minutes() -> i16 {
    let seconds = Local::now().offset().local_minus_utc();
    i16::try_from(seconds / 60).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> DeviceTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn should_recognise_omron_names() {
        assert!(is_omron(Some("BLEsmart_00000116F3A2")));
        assert!(!is_omron(Some("blesmart_lowercase")));
        assert!(!is_omron(Some("Contour7830H")));
        assert!(!is_omron(None));
    }

    #[test]
    fn should_tolerate_drift_up_to_ten_minutes() {
        assert!(!needs_correction(noon(), noon()));
        assert!(!needs_correction(noon() + TimeDelta::minutes(10), noon()));
        assert!(!needs_correction(noon() - TimeDelta::minutes(10), noon()));
    }

    #[test]
    fn should_correct_drift_beyond_ten_minutes() {
        assert!(needs_correction(noon() + TimeDelta::minutes(11), noon()));
        assert!(needs_correction(noon() - TimeDelta::seconds(601), noon()));
    }

    #[test]
    fn should_report_offset_within_a_day() {
        assert!(host_utc_offset_minutes().abs() < 24 * 60);
    }
}
