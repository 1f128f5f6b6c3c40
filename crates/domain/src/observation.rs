//! Observation — a measurement tagged with where and when it arrived.

use serde::Serialize;

use crate::measurement::Measurement;
use crate::profile::ProfileKind;
use crate::time::Timestamp;

/// Unit of delivery to sinks.
///
/// Decoders are pure; the receive time is stamped here by the session so
/// that decoding the same bytes twice yields equal measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Address of the peripheral that produced the value.
    pub source: String,
    pub received_at: Timestamp,
    #[serde(flatten)]
    pub measurement: Measurement,
}

impl Observation {
    #[must_use]
    pub fn new(source: impl Into<String>, received_at: Timestamp, measurement: Measurement) -> Self {
        Self {
            source: source.into(),
            received_at,
            measurement,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        self.measurement.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::BatteryLevel;
    use chrono::{TimeZone, Utc};

    #[test]
    fn should_serialize_as_flat_json_object() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();
        let obs = Observation::new(
            "AA:BB:CC:DD:EE:FF",
            at,
            Measurement::Battery(BatteryLevel { percent: 90 }),
        );
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["source"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(json["received_at"], "2024-03-15T08:30:00Z");
        assert_eq!(json["kind"], "battery");
        assert_eq!(json["value"]["percent"], 90);
        assert_eq!(obs.kind(), ProfileKind::Battery);
    }
}
