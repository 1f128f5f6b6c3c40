//! IEEE-11073 20601 `SFLOAT` (16-bit) and `FLOAT` (32-bit) numbers.
//!
//! Both encodings are `mantissa × 10^exponent` with two's-complement
//! fields:
//!
//! | Type | Exponent | Mantissa |
//! |------|----------|----------|
//! | `SFLOAT` | bits 12–15 (4 bit) | bits 0–11 (12 bit) |
//! | `FLOAT` | bits 24–31 (8 bit) | bits 0–23 (24 bit) |
//!
//! A handful of raw values (exponent 0, reserved mantissas) are not
//! numbers. They decode to non-finite `f64` values:
//!
//! | Meaning | `SFLOAT` raw | `FLOAT` raw | Decoded |
//! |---------|--------------|-------------|---------|
//! | NaN | `0x07FF` | `0x007F_FFFF` | `f64::NAN` |
//! | NRes (not at this resolution) | `0x0800` | `0x0080_0000` | `f64::NAN` |
//! | +Infinity | `0x07FE` | `0x007F_FFFE` | `f64::INFINITY` |
//! | −Infinity | `0x0802` | `0x0080_0002` | `f64::NEG_INFINITY` |
//! | Reserved | `0x0801` | `0x0080_0001` | `f64::NAN` |

use serde::Serialize;

/// Reserved, non-numeric IEEE-11073 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpecialValue {
    NaN,
    NotAtThisResolution,
    PositiveInfinity,
    NegativeInfinity,
    Reserved,
}

impl SpecialValue {
    /// Classify a raw 16-bit `SFLOAT`.
    #[must_use]
    pub fn from_sfloat(raw: u16) -> Option<Self> {
        match raw {
            0x07FF => Some(Self::NaN),
            0x0800 => Some(Self::NotAtThisResolution),
            0x07FE => Some(Self::PositiveInfinity),
            0x0802 => Some(Self::NegativeInfinity),
            0x0801 => Some(Self::Reserved),
            _ => None,
        }
    }

    /// Classify a raw 32-bit `FLOAT`.
    #[must_use]
    pub fn from_float(raw: u32) -> Option<Self> {
        match raw {
            0x007F_FFFF => Some(Self::NaN),
            0x0080_0000 => Some(Self::NotAtThisResolution),
            0x007F_FFFE => Some(Self::PositiveInfinity),
            0x0080_0002 => Some(Self::NegativeInfinity),
            0x0080_0001 => Some(Self::Reserved),
            _ => None,
        }
    }

    /// The `f64` a special value decodes to.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::PositiveInfinity => f64::INFINITY,
            Self::NegativeInfinity => f64::NEG_INFINITY,
            Self::NaN | Self::NotAtThisResolution | Self::Reserved => f64::NAN,
        }
    }
}

/// Decode a raw `SFLOAT`.
#[must_use]
pub fn sfloat_to_f64(raw: u16) -> f64 {
    if let Some(special) = SpecialValue::from_sfloat(raw) {
        return special.as_f64();
    }
    let mantissa = i32::from((raw << 4).cast_signed() >> 4);
    let exponent = i32::from(raw.cast_signed() >> 12);
    scale(mantissa, exponent)
}

/// Decode a raw `FLOAT`.
#[must_use]
pub fn float_to_f64(raw: u32) -> f64 {
    if let Some(special) = SpecialValue::from_float(raw) {
        return special.as_f64();
    }
    let mantissa = (raw << 8).cast_signed() >> 8;
    let exponent = raw.cast_signed() >> 24;
    scale(mantissa, exponent)
}

/// Encode a mantissa/exponent pair as a raw `SFLOAT`.
///
/// Returns `None` when either field does not fit, or when the pair
/// collides with one of the reserved special values.
#[must_use]
pub fn encode_sfloat(mantissa: i16, exponent: i8) -> Option<u16> {
    if !(-2048..=2047).contains(&mantissa) || !(-8..=7).contains(&exponent) {
        return None;
    }
    let raw = ((u16::from(exponent.cast_unsigned()) & 0x0F) << 12)
        | (mantissa.cast_unsigned() & 0x0FFF);
    if SpecialValue::from_sfloat(raw).is_some() {
        return None;
    }
    Some(raw)
}

// Negative exponents divide so that e.g. 365e-1 lands exactly on 36.5.
fn scale(mantissa: i32, exponent: i32) -> f64 {
    let factor = 10f64.powi(exponent.abs());
    if exponent < 0 {
        f64::from(mantissa) / factor
    } else {
        f64::from(mantissa) * factor
    }
}
