//! Measurements — typed values decoded from one characteristic value.
//!
//! Each submodule owns the wire format of exactly one GATT characteristic
//! and exposes a pure `decode(&[u8])` constructor. [`Measurement`] is the
//! closed sum over all of them; the matching tag is
//! [`ProfileKind`](crate::profile::ProfileKind).

pub mod battery;
pub mod blood_pressure;
pub mod current_time;
pub mod glucose;
pub mod heart_rate;
pub mod pulse_oximeter;
pub mod temperature;
pub mod weight;

pub use battery::BatteryLevel;
pub use blood_pressure::{BloodPressure, BloodPressureStatus};
pub use current_time::CurrentTime;
pub use glucose::{Glucose, SampleLocation, SampleType};
pub use heart_rate::{HeartRate, SensorContact};
pub use pulse_oximeter::{PulseOximeterContinuous, PulseOximeterSpot};
pub use temperature::{Temperature, TemperatureType};
pub use weight::Weight;

use serde::Serialize;

use crate::profile::ProfileKind;

/// Unit a measurement value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    MillimetreOfMercury,
    Kilopascal,
    MilligramPerDecilitre,
    MillimolePerLitre,
    Celsius,
    Fahrenheit,
    Kilogram,
    Pound,
    Metre,
    Inch,
}

/// A decoded characteristic value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measurement {
    Battery(BatteryLevel),
    HeartRate(HeartRate),
    BloodPressure(BloodPressure),
    Glucose(Glucose),
    PulseOximeterSpot(PulseOximeterSpot),
    PulseOximeterContinuous(PulseOximeterContinuous),
    Temperature(Temperature),
    Weight(Weight),
    CurrentTime(CurrentTime),
}

impl Measurement {
    /// The profile this measurement was decoded from.
    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Battery(_) => ProfileKind::Battery,
            Self::HeartRate(_) => ProfileKind::HeartRate,
            Self::BloodPressure(_) => ProfileKind::BloodPressure,
            Self::Glucose(_) => ProfileKind::Glucose,
            Self::PulseOximeterSpot(_) => ProfileKind::PulseOximeterSpot,
            Self::PulseOximeterContinuous(_) => ProfileKind::PulseOximeterContinuous,
            Self::Temperature(_) => ProfileKind::Temperature,
            Self::Weight(_) => ProfileKind::Weight,
            Self::CurrentTime(_) => ProfileKind::CurrentTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_kind_of_each_variant() {
        let battery = Measurement::Battery(BatteryLevel { percent: 50 });
        assert_eq!(battery.kind(), ProfileKind::Battery);

        let hr = Measurement::HeartRate(HeartRate {
            pulse: 60,
            sensor_contact: SensorContact::NotSupported,
            energy_expended: None,
            rr_intervals: Vec::new(),
        });
        assert_eq!(hr.kind(), ProfileKind::HeartRate);
    }

    #[test]
    fn should_serialize_with_kind_tag() {
        let m = Measurement::Battery(BatteryLevel { percent: 87 });
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["kind"], "battery");
        assert_eq!(json["value"]["percent"], 87);
    }

    #[test]
    fn should_serialize_unit_in_snake_case() {
        let json = serde_json::to_string(&Unit::MillimetreOfMercury).unwrap();
        assert_eq!(json, "\"millimetre_of_mercury\"");
    }
}
