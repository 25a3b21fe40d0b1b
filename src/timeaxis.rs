//! # Time Axis Normalization
//!
//! Climate-model files encode the time coordinate as numeric offsets from a
//! reference datetime, described by CF convention attributes:
//!
//! - `units`: `"<unit> since <reference>"`, e.g. `"days since 1850-01-01"`
//! - `calendar`: `"standard"`, `"noleap"`, `"365_day"`, ...
//!
//! This module parses those attributes and converts the offsets into
//! `chrono::NaiveDateTime` timestamps. Normalization is idempotent: an axis
//! that already holds decoded timestamps normalizes to itself.
//!
//! The offsets are assumed self-consistent with their attributes; no
//! monotonicity or range validation is performed beyond what the timestamp
//! arithmetic itself rejects.

use crate::error::{Nc2SeriesError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use log::debug;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days in each month of the fixed 365-day calendar.
const NOLEAP_MONTH_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// CF calendar systems supported for timestamp normalization.
///
/// CMIP6 CESM output uses `noleap`; reanalysis products commonly use
/// `standard`. Calendars that cannot be represented as real `chrono` dates
/// (e.g. `360_day`, where February 30th exists) are rejected rather than
/// silently approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// Proleptic Gregorian arithmetic (also `gregorian`, `proleptic_gregorian`)
    Standard,
    /// Fixed 365-day years, no leap days (also `365_day`)
    NoLeap,
}

impl Calendar {
    /// Parses a CF `calendar` attribute value.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::Standard),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            other => Err(Nc2SeriesError::UnsupportedCalendar(other.to_string())),
        }
    }
}

/// The base unit of a CF time encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CfUnit {
    fn seconds(self) -> f64 {
        match self {
            CfUnit::Days => 86_400.0,
            CfUnit::Hours => 3_600.0,
            CfUnit::Minutes => 60.0,
            CfUnit::Seconds => 1.0,
        }
    }
}

/// Parsed form of a CF `units` attribute: a base unit and a reference
/// datetime the numeric offsets count from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub unit: CfUnit,
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    /// Parses a `units` string such as `"days since 1850-01-01 00:00:00"`.
    ///
    /// The reference may be a bare date, a space-separated datetime, or an
    /// ISO 8601 `T`-separated datetime. Fractional seconds are accepted.
    pub fn parse(units: &str) -> Result<Self> {
        let mut parts = units.split_whitespace();
        let unit_word = parts
            .next()
            .ok_or_else(|| Nc2SeriesError::InvalidTimeUnits(units.to_string()))?;
        let since = parts.next();
        if since.map(|w| w.to_lowercase()) != Some("since".to_string()) {
            return Err(Nc2SeriesError::InvalidTimeUnits(units.to_string()));
        }

        let unit = match unit_word.to_lowercase().as_str() {
            "days" | "day" | "d" => CfUnit::Days,
            "hours" | "hour" | "hr" | "h" => CfUnit::Hours,
            "minutes" | "minute" | "min" => CfUnit::Minutes,
            "seconds" | "second" | "sec" | "s" => CfUnit::Seconds,
            _ => return Err(Nc2SeriesError::InvalidTimeUnits(units.to_string())),
        };

        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            return Err(Nc2SeriesError::InvalidTimeUnits(units.to_string()));
        }
        let reference = parse_reference(&rest.join(" "))
            .ok_or_else(|| Nc2SeriesError::InvalidTimeUnits(units.to_string()))?;

        Ok(Self { unit, reference })
    }
}

fn parse_reference(text: &str) -> Option<NaiveDateTime> {
    // Some files suffix the reference with a timezone marker; only UTC-style
    // markers are tolerated since the offsets are calendar-relative anyway.
    let text = text
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Converts a single numeric offset into a timestamp.
pub fn decode_offset(offset: f64, units: &TimeUnits, calendar: Calendar) -> Result<NaiveDateTime> {
    let millis = offset * units.unit.seconds() * 1_000.0;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(Nc2SeriesError::TimeOutOfRange(offset));
    }
    let millis = millis.round() as i64;

    match calendar {
        Calendar::Standard => units
            .reference
            .checked_add_signed(TimeDelta::milliseconds(millis))
            .ok_or(Nc2SeriesError::TimeOutOfRange(offset)),
        Calendar::NoLeap => decode_noleap(units.reference, millis, offset),
    }
}

/// Adds a millisecond offset to a reference datetime under 365-day years.
///
/// Every year has exactly 365 days, so a date is (year, day-of-year); the
/// day-of-year maps back through the fixed month table. February 29th never
/// appears in the result.
fn decode_noleap(reference: NaiveDateTime, millis: i64, offset: f64) -> Result<NaiveDateTime> {
    const YEAR_MILLIS: i64 = 365 * MILLIS_PER_DAY;

    let ref_doy = noleap_day_of_year(reference.month(), reference.day())
        .ok_or(Nc2SeriesError::TimeOutOfRange(offset))?;
    let ref_millis_into_year = i64::from(ref_doy) * MILLIS_PER_DAY
        + i64::from(reference.time().num_seconds_from_midnight()) * 1_000;

    let total = ref_millis_into_year
        .checked_add(millis)
        .ok_or(Nc2SeriesError::TimeOutOfRange(offset))?;
    let year_delta = total.div_euclid(YEAR_MILLIS);
    let rem = total.rem_euclid(YEAR_MILLIS);

    let year = reference.year() + year_delta as i32;
    let doy = (rem / MILLIS_PER_DAY) as u32;
    let millis_of_day = rem % MILLIS_PER_DAY;
    let (month, day) = noleap_month_day(doy);

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(Nc2SeriesError::TimeOutOfRange(offset))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (millis_of_day / 1_000) as u32,
        ((millis_of_day % 1_000) * 1_000_000) as u32,
    )
    .ok_or(Nc2SeriesError::TimeOutOfRange(offset))?;
    Ok(date.and_time(time))
}

/// Zero-based day of year in the 365-day calendar, or `None` for Feb 29.
fn noleap_day_of_year(month: u32, day: u32) -> Option<u32> {
    let m = month.checked_sub(1)? as usize;
    if m >= 12 || day == 0 || day > NOLEAP_MONTH_DAYS[m] {
        return None;
    }
    let preceding: u32 = NOLEAP_MONTH_DAYS[..m].iter().sum();
    Some(preceding + day - 1)
}

/// Maps a zero-based day of year back to (month, day) in the 365-day calendar.
fn noleap_month_day(mut doy: u32) -> (u32, u32) {
    for (m, &len) in NOLEAP_MONTH_DAYS.iter().enumerate() {
        if doy < len {
            return (m as u32 + 1, doy + 1);
        }
        doy -= len;
    }
    (12, 31)
}

/// Decodes a full offset array into timestamps.
pub fn decode_offsets(
    offsets: &[f64],
    units: &TimeUnits,
    calendar: Calendar,
) -> Result<Vec<NaiveDateTime>> {
    offsets
        .iter()
        .map(|&o| decode_offset(o, units, calendar))
        .collect()
}

/// A time coordinate axis, either in its on-disk numeric encoding or already
/// normalized to calendar timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeAxis {
    /// Numeric offsets plus the attributes needed to decode them
    Raw {
        offsets: Vec<f64>,
        units: TimeUnits,
        calendar: Calendar,
    },
    /// Decoded timestamp sequence
    Decoded(Vec<NaiveDateTime>),
}

impl TimeAxis {
    /// Reads the named time coordinate variable together with its `units` and
    /// `calendar` attributes. A missing `calendar` attribute defaults to the
    /// standard calendar, per CF conventions.
    pub fn from_file(file: &netcdf::File, name: &str) -> Result<Self> {
        let var = file
            .variable(name)
            .ok_or_else(|| Nc2SeriesError::CoordinateNotFound(name.to_string()))?;
        let offsets = var.get_values::<f64, _>(..)?;

        let units_text = string_attribute(&var, "units")
            .ok_or_else(|| Nc2SeriesError::InvalidTimeUnits("<missing units attribute>".into()))?;
        let units = TimeUnits::parse(&units_text)?;

        let calendar = match string_attribute(&var, "calendar") {
            Some(name) => Calendar::parse(&name)?,
            None => Calendar::Standard,
        };

        debug!(
            "time axis '{}': {} steps, units '{}', calendar {:?}",
            name,
            offsets.len(),
            units_text,
            calendar
        );
        Ok(TimeAxis::Raw {
            offsets,
            units,
            calendar,
        })
    }

    /// Normalizes the axis to calendar timestamps.
    ///
    /// Applying this twice yields the same sequence as applying it once: a
    /// decoded axis passes through unchanged.
    pub fn normalize(self) -> Result<Self> {
        match self {
            TimeAxis::Raw {
                offsets,
                units,
                calendar,
            } => Ok(TimeAxis::Decoded(decode_offsets(&offsets, &units, calendar)?)),
            decoded @ TimeAxis::Decoded(_) => Ok(decoded),
        }
    }

    /// The decoded timestamp sequence, if the axis has been normalized.
    pub fn timestamps(&self) -> Option<&[NaiveDateTime]> {
        match self {
            TimeAxis::Decoded(stamps) => Some(stamps),
            TimeAxis::Raw { .. } => None,
        }
    }

    /// The raw numeric offsets, if the axis is still in its on-disk encoding.
    pub fn raw_offsets(&self) -> Option<&[f64]> {
        match self {
            TimeAxis::Raw { offsets, .. } => Some(offsets),
            TimeAxis::Decoded(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TimeAxis::Raw { offsets, .. } => offsets.len(),
            TimeAxis::Decoded(stamps) => stamps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads a string attribute from a variable, if present.
pub fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    let value = var.attribute(name)?.value().ok()?;
    match value {
        netcdf::AttributeValue::Str(s) => Some(s),
        netcdf::AttributeValue::Strs(ss) => ss.first().cloned(),
        _ => None,
    }
}
