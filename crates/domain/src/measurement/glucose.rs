//! Glucose Measurement (`0x2A18`).
//!
//! | Flag bit | Meaning |
//! |----------|---------|
//! | 0 | time offset (s16, minutes) present |
//! | 1 | concentration, type and sample location present |
//! | 2 | concentration unit: 0 = kg/L, 1 = mol/L |
//! | 3 | sensor status annunciation present |
//! | 4 | a Glucose Measurement Context notification follows |
//!
//! Layout: flags, sequence number (u16), base time (date-time), then the
//! optional fields in flag order. Concentrations are rescaled to mg/dL
//! (×100 000) or mmol/L (×1000).
//!
//! Meters stream stored records only after a "report stored records"
//! request on the Record Access Control Point, see
//! [`GLUCOSE_RECORD_ACCESS_CONTROL_POINT`](crate::profile::GLUCOSE_RECORD_ACCESS_CONTROL_POINT).

use chrono::TimeDelta;
use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::error::{CursorError, DecodeError};
use crate::measurement::Unit;
use crate::time::DeviceTime;

const PROFILE: &str = "glucose";

const FLAG_TIME_OFFSET: u8 = 0x01;
const FLAG_CONCENTRATION: u8 = 0x02;
const FLAG_MOL_PER_LITRE: u8 = 0x04;
const FLAG_SENSOR_STATUS: u8 = 0x08;
const FLAG_CONTEXT_FOLLOWS: u8 = 0x10;

const KG_PER_L_TO_MG_PER_DL: f64 = 100_000.0;
const MOL_PER_L_TO_MMOL_PER_L: f64 = 1_000.0;

/// Fluid the sample was taken from (low nibble of the type/location byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    CapillaryWholeBlood,
    CapillaryPlasma,
    VenousWholeBlood,
    VenousPlasma,
    ArterialWholeBlood,
    ArterialPlasma,
    UndeterminedWholeBlood,
    UndeterminedPlasma,
    InterstitialFluid,
    ControlSolution,
    Reserved(u8),
}

impl SampleType {
    fn from_nibble(nibble: u8) -> Self {
        match nibble {
            1 => Self::CapillaryWholeBlood,
            2 => Self::CapillaryPlasma,
            3 => Self::VenousWholeBlood,
            4 => Self::VenousPlasma,
            5 => Self::ArterialWholeBlood,
            6 => Self::ArterialPlasma,
            7 => Self::UndeterminedWholeBlood,
            8 => Self::UndeterminedPlasma,
            9 => Self::InterstitialFluid,
            10 => Self::ControlSolution,
            other => Self::Reserved(other),
        }
    }
}

/// Where on the body the sample was taken (high nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleLocation {
    Finger,
    AlternateSiteTest,
    Earlobe,
    ControlSolution,
    NotAvailable,
    Reserved(u8),
}

impl SampleLocation {
    fn from_nibble(nibble: u8) -> Self {
        match nibble {
            1 => Self::Finger,
            2 => Self::AlternateSiteTest,
            3 => Self::Earlobe,
            4 => Self::ControlSolution,
            15 => Self::NotAvailable,
            other => Self::Reserved(other),
        }
    }
}

/// One stored or live glucose record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glucose {
    pub sequence_number: u16,
    /// Base time with the time offset already applied.
    pub timestamp: DeviceTime,
    pub time_offset_minutes: Option<i16>,
    /// Concentration in `unit`; `None` when the record carries no value.
    pub value: Option<f64>,
    /// [`Unit::MilligramPerDecilitre`] or [`Unit::MillimolePerLitre`].
    pub unit: Unit,
    pub sample_type: Option<SampleType>,
    pub sample_location: Option<SampleLocation>,
    pub sensor_status: Option<u16>,
    pub context_will_follow: bool,
}

impl Glucose {
    /// Decode a glucose measurement value.
    ///
    /// The type/location byte is read only when it is actually present;
    /// some meters omit it even though flag bit 1 is set.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] when a mandatory or
    /// flagged field is missing, or the base time is invalid.
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        Self::read(&mut ByteCursor::new(value)).map_err(DecodeError::malformed(PROFILE))
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CursorError> {
        let flags = cursor.u8()?;
        let (unit, multiplier) = if flags & FLAG_MOL_PER_LITRE == 0 {
            (Unit::MilligramPerDecilitre, KG_PER_L_TO_MG_PER_DL)
        } else {
            (Unit::MillimolePerLitre, MOL_PER_L_TO_MMOL_PER_L)
        };

        let sequence_number = cursor.u16()?;
        let mut timestamp = cursor.datetime()?;

        let time_offset_minutes = if flags & FLAG_TIME_OFFSET != 0 {
            let offset = cursor.s16()?;
            timestamp += TimeDelta::minutes(i64::from(offset));
            Some(offset)
        } else {
            None
        };

        let mut value = None;
        let mut sample_type = None;
        let mut sample_location = None;
        if flags & FLAG_CONCENTRATION != 0 {
            value = Some(cursor.sfloat()? * multiplier);
            // the two status bytes, when flagged, are never the type byte
            let status_len = if flags & FLAG_SENSOR_STATUS == 0 { 0 } else { 2 };
            if cursor.remaining() > status_len {
                let packed = cursor.u8()?;
                sample_type = Some(SampleType::from_nibble(packed & 0x0F));
                sample_location = Some(SampleLocation::from_nibble(packed >> 4));
            }
        }

        let sensor_status = if flags & FLAG_SENSOR_STATUS != 0 {
            Some(cursor.u16()?)
        } else {
            None
        };

        Ok(Self {
            sequence_number,
            timestamp,
            time_offset_minutes,
            value,
            unit,
            sample_type,
            sample_location,
            sensor_status,
            context_will_follow: flags & FLAG_CONTEXT_FOLLOWS != 0,
        })
    }
}
