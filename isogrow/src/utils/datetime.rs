//! Date/time parsing
//!
//! ISO9660 has two datetime formats: 7-byte binary and 17-byte ASCII.
//! Both decode to a count relative to the Unix epoch, normalized to UTC.
//! An unspecified datetime decodes to 0.

use crate::error::{Error, Result};
use crate::types::{LONG_DATETIME_SIZE, SHORT_DATETIME_SIZE};
use crate::utils::bytes::ByteView;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Seconds per GMT offset unit
const OFFSET_UNIT_SECONDS: i64 = 15 * 60;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// 7-byte directory record datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; SHORT_DATETIME_SIZE]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }

    /// Year byte 0 marks an unrecorded datetime
    pub fn is_unspecified(&self) -> bool {
        self.year == 0
    }

    /// Seconds since the epoch, UTC
    pub fn to_unix_seconds(&self) -> i64 {
        if self.is_unspecified() {
            return 0;
        }
        let Some(local) = epoch_seconds(
            i32::from(self.full_year()),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ) else {
            log::warn!("unrepresentable recording date {self:?}");
            return 0;
        };
        local - i64::from(self.gmt_offset) * OFFSET_UNIT_SECONDS
    }
}

/// 17-byte ASCII datetime (volume descriptors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime17 {
    /// Year (4 ASCII digits)
    pub year: u16,

    /// Month (2 ASCII digits, 1-12)
    pub month: u8,

    /// Day (2 ASCII digits, 1-31)
    pub day: u8,

    /// Hour (2 ASCII digits, 0-23)
    pub hour: u8,

    /// Minute (2 ASCII digits, 0-59)
    pub minute: u8,

    /// Second (2 ASCII digits, 0-59)
    pub second: u8,

    /// Hundredths (2 ASCII digits)
    pub hundredths: u8,

    /// GMT offset in 15-minute intervals
    pub gmt_offset: i8,
}

impl DateTime17 {
    /// Parse from 17-byte ASCII string
    ///
    /// Returns `None` when the year is `0000` (or left as NUL bytes), which
    /// the standard uses for "not specified".
    pub fn from_bytes(bytes: &[u8; LONG_DATETIME_SIZE]) -> Result<Option<Self>> {
        if &bytes[0..4] == b"0000" || bytes[0..4] == [0; 4] {
            return Ok(None);
        }
        Ok(Some(Self {
            year: digits(&bytes[0..4])? as u16,
            month: digits(&bytes[4..6])? as u8,
            day: digits(&bytes[6..8])? as u8,
            hour: digits(&bytes[8..10])? as u8,
            minute: digits(&bytes[10..12])? as u8,
            second: digits(&bytes[12..14])? as u8,
            hundredths: digits(&bytes[14..16])? as u8,
            gmt_offset: bytes[16] as i8,
        }))
    }

    /// Milliseconds since the epoch, UTC, with centisecond precision
    pub fn to_unix_millis(&self) -> i64 {
        let Some(local) = epoch_seconds(
            i32::from(self.year),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ) else {
            log::warn!("unrepresentable volume date {self:?}");
            return 0;
        };
        let seconds = local - i64::from(self.gmt_offset) * OFFSET_UNIT_SECONDS;
        seconds * 1000 + i64::from(self.hundredths) * 10
    }
}

/// Decode the 7-byte form at `at` into seconds since the epoch
pub fn short_datetime(view: ByteView<'_>, at: usize) -> Result<i64> {
    let raw: &[u8; SHORT_DATETIME_SIZE] = view
        .slice(at, SHORT_DATETIME_SIZE)?
        .try_into()
        .map_err(|_| Error::InvalidDatetime)?;
    Ok(DateTime7::from_bytes(raw).to_unix_seconds())
}

/// Decode the 17-byte form at `at` into milliseconds since the epoch
pub fn long_datetime(view: ByteView<'_>, at: usize) -> Result<i64> {
    let raw: &[u8; LONG_DATETIME_SIZE] = view
        .slice(at, LONG_DATETIME_SIZE)?
        .try_into()
        .map_err(|_| Error::InvalidDatetime)?;
    match DateTime17::from_bytes(raw)? {
        Some(datetime) => Ok(datetime.to_unix_millis()),
        None => Ok(0),
    }
}

/// Calendar fields read as UTC, no daylight-saving interpretation
///
/// Out-of-range fields carry into the next unit: month 0 is December of the
/// year before, day 0 the last day of the previous month, hour 24 the next
/// midnight. `None` only when the carried year leaves the calendar.
fn epoch_seconds(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<i64> {
    let months = i32::from(month) - 1;
    let year = year + months.div_euclid(12);
    let month = Month::try_from(months.rem_euclid(12) as u8 + 1).ok()?;
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let midnight = PrimitiveDateTime::new(first, Time::MIDNIGHT)
        .assume_utc()
        .unix_timestamp();
    let days = i64::from(day) - 1;
    Some(
        midnight
            + days * SECONDS_PER_DAY
            + i64::from(hour) * 3600
            + i64::from(minute) * 60
            + i64::from(second),
    )
}

fn digits(ascii: &[u8]) -> Result<u32> {
    ascii.iter().try_fold(0u32, |acc, &c| {
        if c.is_ascii_digit() {
            Ok(acc * 10 + u32::from(c - b'0'))
        } else {
            Err(Error::InvalidDatetime)
        }
    })
}
