//! Registry of the GATT profiles this system understands.
//!
//! [`ProfileKind`] is a closed tag: every variant knows its standard
//! (service, characteristic) pair and which decoder turns a value into a
//! [`Measurement`]. There is no runtime lookup table; adding a profile
//! means adding a variant and the compiler points at every match that
//! needs updating.
//!
//! | Kind | Service | Characteristic |
//! |------|---------|----------------|
//! | Battery | `0x180F` | `0x2A19` |
//! | `HeartRate` | `0x180D` | `0x2A37` |
//! | Temperature | `0x1809` | `0x2A1C` |
//! | Weight | `0x181D` | `0x2A9D` |
//! | `BloodPressure` | `0x1810` | `0x2A35` |
//! | `PulseOximeterSpot` | `0x1822` | `0x2A5E` |
//! | `PulseOximeterContinuous` | `0x1822` | `0x2A5F` |
//! | Glucose | `0x1808` | `0x2A18` |
//! | `CurrentTime` | `0x1805` | `0x2A2B` |

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DecodeError;
use crate::measurement::{
    BatteryLevel, BloodPressure, CurrentTime, Glucose, HeartRate, Measurement,
    PulseOximeterContinuous, PulseOximeterSpot, Temperature, Weight,
};

/// Expand a 16-bit SIG-assigned number onto the Bluetooth base UUID
/// `0000xxxx-0000-1000-8000-00805F9B34FB`.
#[must_use]
#[allow(clippy::cast_lossless)]
pub const fn sig_uuid(short: u16) -> Uuid {
    Uuid::from_u128(((short as u128) << 96) | 0x0000_0000_0000_1000_8000_0080_5F9B_34FB)
}

pub const BATTERY_SERVICE: Uuid = sig_uuid(0x180F);
pub const HEART_RATE_SERVICE: Uuid = sig_uuid(0x180D);
pub const HEALTH_THERMOMETER_SERVICE: Uuid = sig_uuid(0x1809);
pub const WEIGHT_SCALE_SERVICE: Uuid = sig_uuid(0x181D);
pub const BLOOD_PRESSURE_SERVICE: Uuid = sig_uuid(0x1810);
pub const PULSE_OXIMETER_SERVICE: Uuid = sig_uuid(0x1822);
pub const GLUCOSE_SERVICE: Uuid = sig_uuid(0x1808);
pub const CURRENT_TIME_SERVICE: Uuid = sig_uuid(0x1805);

/// Glucose Record Access Control Point. Writing
/// [`REPORT_ALL_STORED_RECORDS`] makes the meter stream its history.
pub const GLUCOSE_RECORD_ACCESS_CONTROL_POINT: Uuid = sig_uuid(0x2A52);

/// RACP command: op code "report stored records", operator "all records".
pub const REPORT_ALL_STORED_RECORDS: [u8; 2] = [0x01, 0x01];

/// A (service, characteristic) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileDescriptor {
    pub service: Uuid,
    pub characteristic: Uuid,
}

/// Every characteristic the session subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Battery,
    HeartRate,
    Temperature,
    Weight,
    BloodPressure,
    PulseOximeterSpot,
    PulseOximeterContinuous,
    Glucose,
    CurrentTime,
}

impl ProfileKind {
    /// All kinds, in the order a session subscribes to them.
    pub const ALL: [Self; 9] = [
        Self::Battery,
        Self::HeartRate,
        Self::Temperature,
        Self::Weight,
        Self::BloodPressure,
        Self::PulseOximeterSpot,
        Self::PulseOximeterContinuous,
        Self::Glucose,
        Self::CurrentTime,
    ];

    /// Standard service/characteristic pair of this profile.
    #[must_use]
    pub const fn descriptor(self) -> ProfileDescriptor {
        let (service, characteristic) = match self {
            Self::Battery => (BATTERY_SERVICE, sig_uuid(0x2A19)),
            Self::HeartRate => (HEART_RATE_SERVICE, sig_uuid(0x2A37)),
            Self::Temperature => (HEALTH_THERMOMETER_SERVICE, sig_uuid(0x2A1C)),
            Self::Weight => (WEIGHT_SCALE_SERVICE, sig_uuid(0x2A9D)),
            Self::BloodPressure => (BLOOD_PRESSURE_SERVICE, sig_uuid(0x2A35)),
            Self::PulseOximeterSpot => (PULSE_OXIMETER_SERVICE, sig_uuid(0x2A5E)),
            Self::PulseOximeterContinuous => (PULSE_OXIMETER_SERVICE, sig_uuid(0x2A5F)),
            Self::Glucose => (GLUCOSE_SERVICE, sig_uuid(0x2A18)),
            Self::CurrentTime => (CURRENT_TIME_SERVICE, sig_uuid(0x2A2B)),
        };
        ProfileDescriptor {
            service,
            characteristic,
        }
    }

    #[must_use]
    pub const fn service_uuid(self) -> Uuid {
        self.descriptor().service
    }

    #[must_use]
    pub const fn characteristic_uuid(self) -> Uuid {
        self.descriptor().characteristic
    }

    /// Find the kind whose characteristic is `uuid`.
    ///
    /// Characteristic UUIDs are unique across the registry, so the
    /// service is not needed to disambiguate.
    #[must_use]
    pub fn from_characteristic(uuid: Uuid) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.characteristic_uuid() == uuid)
    }

    /// Decode `value` with this profile's decoder.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when the bytes do not
    /// match the profile's layout.
    pub fn decode(self, value: &[u8]) -> Result<Measurement, DecodeError> {
        Ok(match self {
            Self::Battery => Measurement::Battery(BatteryLevel::decode(value)?),
            Self::HeartRate => Measurement::HeartRate(HeartRate::decode(value)?),
            Self::Temperature => Measurement::Temperature(Temperature::decode(value)?),
            Self::Weight => Measurement::Weight(Weight::decode(value)?),
            Self::BloodPressure => Measurement::BloodPressure(BloodPressure::decode(value)?),
            Self::PulseOximeterSpot => {
                Measurement::PulseOximeterSpot(PulseOximeterSpot::decode(value)?)
            }
            Self::PulseOximeterContinuous => {
                Measurement::PulseOximeterContinuous(PulseOximeterContinuous::decode(value)?)
            }
            Self::Glucose => Measurement::Glucose(Glucose::decode(value)?),
            Self::CurrentTime => Measurement::CurrentTime(CurrentTime::decode(value)?),
        })
    }

    /// Short human readable name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::HeartRate => "heart_rate",
            Self::Temperature => "temperature",
            Self::Weight => "weight",
            Self::BloodPressure => "blood_pressure",
            Self::PulseOximeterSpot => "pulse_oximeter_spot",
            Self::PulseOximeterContinuous => "pulse_oximeter_continuous",
            Self::Glucose => "glucose",
            Self::CurrentTime => "current_time",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn should_expand_short_uuid_onto_base_uuid() {
        assert_eq!(
            sig_uuid(0x2A37).to_string(),
            "00002a37-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn should_keep_subscription_order() {
        assert_eq!(ProfileKind::ALL[0], ProfileKind::Battery);
        assert_eq!(ProfileKind::ALL[1], ProfileKind::HeartRate);
        assert_eq!(ProfileKind::ALL[7], ProfileKind::Glucose);
        assert_eq!(ProfileKind::ALL[8], ProfileKind::CurrentTime);
    }

    #[test]
    fn should_have_unique_characteristics() {
        let unique: HashSet<Uuid> = ProfileKind::ALL
            .iter()
            .map(|kind| kind.characteristic_uuid())
            .collect();
        assert_eq!(unique.len(), ProfileKind::ALL.len());
    }

    #[test]
    fn should_share_service_between_plx_profiles() {
        assert_eq!(
            ProfileKind::PulseOximeterSpot.service_uuid(),
            ProfileKind::PulseOximeterContinuous.service_uuid()
        );
    }

    #[test]
    fn should_find_kind_by_characteristic() {
        for kind in ProfileKind::ALL {
            assert_eq!(
                ProfileKind::from_characteristic(kind.characteristic_uuid()),
                Some(kind)
            );
        }
        assert_eq!(
            ProfileKind::from_characteristic(GLUCOSE_RECORD_ACCESS_CONTROL_POINT),
            None
        );
    }

    #[test]
    fn should_decode_through_tag() {
        let m = ProfileKind::HeartRate.decode(&[0x00, 0x50]).unwrap();
        assert_eq!(m.kind(), ProfileKind::HeartRate);

        let m = ProfileKind::Battery.decode(&[0x40]).unwrap();
        assert_eq!(m, Measurement::Battery(BatteryLevel { percent: 64 }));
    }

    #[test]
    fn should_propagate_decode_errors() {
        assert!(ProfileKind::Weight.decode(&[0x00]).is_err());
    }

    #[test]
    fn should_display_snake_case_name() {
        assert_eq!(ProfileKind::PulseOximeterSpot.to_string(), "pulse_oximeter_spot");
    }
}
