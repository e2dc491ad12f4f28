//! Date, dateTime, instant and time values
//!
//! On the wire a temporal value is microseconds since the epoch (or since
//! midnight for `time`), the zone it was written in, and the precision it was
//! written with. Together they reproduce the lexical form exactly, so values
//! that cannot be reproduced (fractions other than 3 or 6 digits, a value
//! finer than its precision) are rejected instead of rounded.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use ferrum_models::PrimitiveType;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Year,
    Month,
    Day,
    Second,
    Millisecond,
    Microsecond,
}

impl Precision {
    pub fn wire_name(self) -> &'static str {
        match self {
            Precision::Year => "YEAR",
            Precision::Month => "MONTH",
            Precision::Day => "DAY",
            Precision::Second => "SECOND",
            Precision::Millisecond => "MILLISECOND",
            Precision::Microsecond => "MICROSECOND",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "YEAR" => Some(Precision::Year),
            "MONTH" => Some(Precision::Month),
            "DAY" => Some(Precision::Day),
            "SECOND" => Some(Precision::Second),
            "MILLISECOND" => Some(Precision::Millisecond),
            "MICROSECOND" => Some(Precision::Microsecond),
            _ => None,
        }
    }

    fn has_time(self) -> bool {
        matches!(
            self,
            Precision::Second | Precision::Millisecond | Precision::Microsecond
        )
    }

    fn allowed_for(self, ty: PrimitiveType) -> bool {
        match ty {
            PrimitiveType::Date => !self.has_time(),
            PrimitiveType::Instant | PrimitiveType::Time => self.has_time(),
            _ => true,
        }
    }
}

/// Wire form of a date, dateTime or instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub value_us: i64,
    pub timezone: String,
    pub precision: Precision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    Malformed(String),
    OutOfRange,
}

fn malformed(reason: impl Into<String>) -> TemporalError {
    TemporalError::Malformed(reason.into())
}

/// `Z`, `UTC` or a `±hh:mm` offset.
pub fn parse_zone(zone: &str) -> Option<FixedOffset> {
    if zone == "Z" || zone == "UTC" {
        return FixedOffset::east_opt(0);
    }
    let bytes = zone.as_bytes();
    if bytes.len() != 6
        || bytes[3] != b':'
        || ![1, 2, 4, 5].iter().all(|&i| bytes[i].is_ascii_digit())
    {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = zone[1..3].parse().ok()?;
    let minutes: i32 = zone[4..6].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a date, dateTime or instant. Partial dates are anchored in `default_zone`.
pub fn parse_date_time(
    ty: PrimitiveType,
    text: &str,
    default_zone: &str,
) -> Result<Timestamp, TemporalError> {
    match text.split_once('T') {
        None => {
            if ty == PrimitiveType::Instant {
                return Err(malformed("an instant needs a time and a zone"));
            }
            let (date, precision) = parse_partial_date(text)?;
            let offset = parse_zone(default_zone)
                .ok_or_else(|| malformed(format!("unsupported timezone '{default_zone}'")))?;
            let midnight = date.and_hms_opt(0, 0, 0).ok_or(TemporalError::OutOfRange)?;
            let local = offset
                .from_local_datetime(&midnight)
                .single()
                .ok_or(TemporalError::OutOfRange)?;
            Ok(Timestamp {
                value_us: local.timestamp_micros(),
                timezone: default_zone.to_string(),
                precision,
            })
        }
        Some((date, time)) => {
            if ty == PrimitiveType::Date {
                return Err(malformed("a date cannot carry a time"));
            }
            if date.len() != 10 {
                return Err(malformed("a time needs a full date"));
            }
            let zone = zone_suffix(time).ok_or_else(|| malformed("a time needs a zone"))?;
            let precision = clock_precision(&time[..time.len() - zone.len()])?;
            let parsed =
                DateTime::parse_from_rfc3339(text).map_err(|e| malformed(e.to_string()))?;
            // leap second: chrono stores it as nanosecond >= 1e9
            if parsed.nanosecond() >= 1_000_000_000 {
                return Err(malformed("leap seconds are not representable"));
            }
            check_year(parsed.year())?;
            Ok(Timestamp {
                value_us: parsed.timestamp_micros(),
                timezone: zone.to_string(),
                precision,
            })
        }
    }
}

/// Lexical form of a timestamp.
pub fn format_date_time(ty: PrimitiveType, ts: &Timestamp) -> Result<String, TemporalError> {
    if !ts.precision.allowed_for(ty) {
        return Err(malformed(format!(
            "{} precision is not valid for {ty}",
            ts.precision.wire_name()
        )));
    }
    let offset = parse_zone(&ts.timezone)
        .ok_or_else(|| malformed(format!("unsupported timezone '{}'", ts.timezone)))?;
    let local = utc_from_micros(ts.value_us)
        .ok_or(TemporalError::OutOfRange)?
        .with_timezone(&offset);
    check_year(local.year())?;
    if !is_truncated(&local, ts.precision) {
        return Err(malformed("value is finer than its precision"));
    }

    let zone = if ts.timezone == "UTC" { "Z" } else { ts.timezone.as_str() };
    Ok(match ts.precision {
        Precision::Year => local.format("%Y").to_string(),
        Precision::Month => local.format("%Y-%m").to_string(),
        Precision::Day => local.format("%Y-%m-%d").to_string(),
        Precision::Second => format!("{}{zone}", local.format("%Y-%m-%dT%H:%M:%S")),
        Precision::Millisecond => format!("{}{zone}", local.format("%Y-%m-%dT%H:%M:%S%.3f")),
        Precision::Microsecond => format!("{}{zone}", local.format("%Y-%m-%dT%H:%M:%S%.6f")),
    })
}

/// Parse a time of day into microseconds since midnight.
pub fn parse_time(text: &str) -> Result<(i64, Precision), TemporalError> {
    let precision = clock_precision(text)?;
    let time =
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f").map_err(|e| malformed(e.to_string()))?;
    let micros = i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND
        + i64::from(time.nanosecond() / 1_000);
    if micros >= MICROS_PER_DAY {
        return Err(TemporalError::OutOfRange);
    }
    Ok((micros, precision))
}

pub fn format_time(micros: i64, precision: Precision) -> Result<String, TemporalError> {
    if !(0..MICROS_PER_DAY).contains(&micros) {
        return Err(TemporalError::OutOfRange);
    }
    if !precision.allowed_for(PrimitiveType::Time) {
        return Err(malformed(format!(
            "{} precision is not valid for time",
            precision.wire_name()
        )));
    }
    let seconds = (micros / MICROS_PER_SECOND) as u32;
    let nanos = ((micros % MICROS_PER_SECOND) * 1_000) as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
        .ok_or(TemporalError::OutOfRange)?;
    if !fraction_fits(nanos, precision) {
        return Err(malformed("value is finer than its precision"));
    }
    Ok(match precision {
        Precision::Millisecond => time.format("%H:%M:%S%.3f").to_string(),
        Precision::Microsecond => time.format("%H:%M:%S%.6f").to_string(),
        _ => time.format("%H:%M:%S").to_string(),
    })
}

fn parse_partial_date(text: &str) -> Result<(NaiveDate, Precision), TemporalError> {
    let bad = || malformed("expected YYYY, YYYY-MM or YYYY-MM-DD");
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    let parts: Vec<&str> = text.split('-').collect();
    let (year, month, day, precision) = match parts.as_slice() {
        [y] => (*y, "01", "01", Precision::Year),
        [y, m] => (*y, *m, "01", Precision::Month),
        [y, m, d] => (*y, *m, *d, Precision::Day),
        _ => return Err(bad()),
    };
    if !digits(year, 4) || !digits(month, 2) || !digits(day, 2) {
        return Err(bad());
    }

    let year: i32 = year.parse().map_err(|_| bad())?;
    check_year(year)?;
    let month: u32 = month.parse().map_err(|_| bad())?;
    let day: u32 = day.parse().map_err(|_| bad())?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| malformed("no such calendar date"))?;
    Ok((date, precision))
}

/// Zone designator at the end of the time part, if any.
fn zone_suffix(time: &str) -> Option<&str> {
    if time.ends_with('Z') {
        return Some(&time[time.len() - 1..]);
    }
    let start = time.len().checked_sub(6)?;
    match time.as_bytes().get(start) {
        Some(b'+') | Some(b'-') => Some(&time[start..]),
        _ => None,
    }
}

/// Precision of `hh:mm:ss[.fff|.ffffff]`.
fn clock_precision(clock: &str) -> Result<Precision, TemporalError> {
    let bytes = clock.as_bytes();
    if bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
        return Err(malformed("expected hh:mm:ss"));
    }
    match clock.get(8..) {
        Some("") => Ok(Precision::Second),
        Some(fraction) if fraction.starts_with('.') => {
            let digits = &fraction[1..];
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("fractional seconds must be digits"));
            }
            match digits.len() {
                3 => Ok(Precision::Millisecond),
                6 => Ok(Precision::Microsecond),
                n => Err(malformed(format!(
                    "{n} fractional digits cannot be represented, use 3 or 6"
                ))),
            }
        }
        _ => Err(malformed("expected hh:mm:ss")),
    }
}

fn check_year(year: i32) -> Result<(), TemporalError> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(TemporalError::OutOfRange)
    }
}

fn utc_from_micros(micros: i64) -> Option<DateTime<Utc>> {
    let seconds = micros.div_euclid(MICROS_PER_SECOND);
    let nanos = (micros.rem_euclid(MICROS_PER_SECOND) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(seconds, nanos)
}

fn fraction_fits(nanos: u32, precision: Precision) -> bool {
    match precision {
        Precision::Millisecond => nanos % 1_000_000 == 0,
        Precision::Microsecond => nanos % 1_000 == 0,
        _ => nanos == 0,
    }
}

fn is_truncated(local: &DateTime<FixedOffset>, precision: Precision) -> bool {
    let midnight = local.num_seconds_from_midnight() == 0 && local.nanosecond() == 0;
    match precision {
        Precision::Year => local.month() == 1 && local.day() == 1 && midnight,
        Precision::Month => local.day() == 1 && midnight,
        Precision::Day => midnight,
        _ => fraction_fits(local.nanosecond(), precision),
    }
}
