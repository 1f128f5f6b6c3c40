//! Sequential typed reader over a characteristic value.
//!
//! GATT health profiles lay out their payloads as a flags byte followed by
//! a run of fields whose presence depends on those flags. [`ByteCursor`]
//! walks such a payload front to back; every read advances the offset by
//! its width, and a read that would overrun the buffer fails with
//! [`CursorError::OutOfRange`] without moving the offset.

use chrono::NaiveDate;

use crate::error::CursorError;
use crate::ieee11073;
use crate::time::DeviceTime;

/// Width of a GATT date-time field.
pub const DATE_TIME_LEN: usize = 7;

/// Byte order for multi-byte integer fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Used by every Bluetooth SIG health profile.
    #[default]
    LittleEndian,
    BigEndian,
}

/// Stateful reader over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    /// Create a little-endian cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_order(data, ByteOrder::LittleEndian)
    }

    /// Create a cursor with an explicit byte order.
    #[must_use]
    pub fn with_order(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            offset: 0,
            order,
        }
    }

    /// Current read offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// `true` once every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        let end = self.offset + N;
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or(CursorError::OutOfRange {
                offset: self.offset,
                width: N,
                len: self.data.len(),
            })?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        self.offset = end;
        Ok(bytes)
    }

    /// Skip `n` bytes (reserved fields).
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than `n` bytes remain.
    pub fn skip(&mut self, n: usize) -> Result<(), CursorError> {
        if self.remaining() < n {
            return Err(CursorError::OutOfRange {
                offset: self.offset,
                width: n,
                len: self.data.len(),
            });
        }
        self.offset += n;
        Ok(())
    }

    /// Read an unsigned byte.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] at the end of the buffer.
    pub fn u8(&mut self) -> Result<u8, CursorError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    /// Read an unsigned 16-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 2 bytes remain.
    pub fn u16(&mut self) -> Result<u16, CursorError> {
        let bytes = self.take::<2>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        })
    }

    /// Read a signed 16-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 2 bytes remain.
    pub fn s16(&mut self) -> Result<i16, CursorError> {
        self.u16().map(u16::cast_signed)
    }

    /// Read an unsigned 24-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 3 bytes remain.
    pub fn u24(&mut self) -> Result<u32, CursorError> {
        let [a, b, c] = self.take::<3>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes([a, b, c, 0]),
            ByteOrder::BigEndian => u32::from_be_bytes([0, a, b, c]),
        })
    }

    /// Read an unsigned 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 4 bytes remain.
    pub fn u32(&mut self) -> Result<u32, CursorError> {
        let bytes = self.take::<4>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        })
    }

    /// Read an IEEE-11073 16-bit `SFLOAT`.
    ///
    /// Reserved values decode to NaN or ±infinity, see [`ieee11073`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 2 bytes remain.
    pub fn sfloat(&mut self) -> Result<f64, CursorError> {
        self.u16().map(ieee11073::sfloat_to_f64)
    }

    /// Read an IEEE-11073 32-bit `FLOAT`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 4 bytes remain.
    pub fn float32(&mut self) -> Result<f64, CursorError> {
        self.u32().map(ieee11073::float_to_f64)
    }

    /// Read a 7-byte GATT date-time.
    ///
    /// | Bytes | Field |
    /// |-------|-------|
    /// | 0–1 | year (u16) |
    /// | 2 | month (1–12) |
    /// | 3 | day (1–31) |
    /// | 4 | hours (0–23) |
    /// | 5 | minutes (0–59) |
    /// | 6 | seconds (0–59) |
    ///
    /// Out-of-calendar values (month 0, Feb 30, hour 24, …) are rejected
    /// rather than clamped. The offset only moves on success.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::OutOfRange`] if fewer than 7 bytes remain, or
    /// [`CursorError::InvalidDateTime`] for impossible field values.
    pub fn datetime(&mut self) -> Result<DeviceTime, CursorError> {
        let start = self.offset;
        let result = self.read_datetime();
        if result.is_err() {
            self.offset = start;
        }
        result
    }

    fn read_datetime(&mut self) -> Result<DeviceTime, CursorError> {
        if self.remaining() < DATE_TIME_LEN {
            return Err(CursorError::OutOfRange {
                offset: self.offset,
                width: DATE_TIME_LEN,
                len: self.data.len(),
            });
        }
        let year = self.u16()?;
        let [month, day, hour, minute, second] = self.take::<5>()?;

        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .and_then(|date| {
                date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
            })
            .ok_or(CursorError::InvalidDateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
            })
    }
}
