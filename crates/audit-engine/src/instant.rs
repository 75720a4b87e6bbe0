//! Instant parsing, timezone conversion, formatting, and one-shot arithmetic.
//!
//! Instants cross the API as text. The canonical rendering is
//! [`TIMESTAMP_FORMAT`] (`YYYY-MM-DD HH:mm:ss`); every function that consumes
//! an instant accepts the date-like shapes listed at [`parse_date_like`] and
//! every function that receives an empty string returns an empty string, so
//! chained computations propagate "no date" without branching.

use std::fmt::{self, Write};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{AuditError, Result};
use crate::interval::{Interval, IntervalUnit, Sign};

/// Canonical timestamp format (`YYYY-MM-DD HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical format with a trailing zone abbreviation (`... CST`).
pub const TIMESTAMP_FORMAT_ZONED: &str = "%Y-%m-%d %H:%M:%S %Z";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// ── Conversion and formatting ───────────────────────────────────────────────

/// Re-render an instant from one timezone into another.
///
/// `instant` is interpreted as wall-clock time in `zone_from`; the same
/// absolute instant is rendered as wall-clock time in `zone_to` using
/// `format` (canonical when `None`). An empty `instant` returns an empty
/// string unchanged.
///
/// # Errors
///
/// [`AuditError::InvalidTimezone`] for an unknown IANA zone name,
/// [`AuditError::InvalidDatetime`] for unparseable non-empty input, and
/// [`AuditError::InvalidFormat`] for a format string chrono cannot render.
///
/// # Examples
///
/// ```
/// use audit_engine::convert;
///
/// let utc = convert("2017-03-01 00:00:00", "US/Central", "UTC", None).unwrap();
/// assert_eq!(utc, "2017-03-01 06:00:00");
/// ```
pub fn convert(instant: &str, zone_from: &str, zone_to: &str, format: Option<&str>) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let from = parse_timezone(zone_from)?;
    let to = parse_timezone(zone_to)?;
    let naive = parse_date_like(instant)?;
    let dt = localize(naive, from)?.with_timezone(&to);
    render(&dt, format.unwrap_or(TIMESTAMP_FORMAT))
}

/// Reduce a date-like value to a calendar date string (`YYYY-MM-DD`),
/// discarding time-of-day. Empty input returns an empty string. Idempotent
/// on ISO date strings.
pub fn to_iso_date(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    let naive = parse_date_like(value)?;
    Ok(naive.date().format(ISO_DATE_FORMAT).to_string())
}

/// Whether `value` parses as a real calendar date.
///
/// The text must begin with an ASCII digit; this rejects natural-language
/// strings that a lenient date parser would otherwise accept.
pub fn is_valid_date(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) && parse_date_like(trimmed).is_ok()
}

/// The abbreviation a zone uses at a given instant (e.g. `CST` or `CDT`
/// for `America/Chicago`, depending on the date).
pub fn zone_abbr(zone: &str, instant: &str) -> Result<String> {
    let tz = parse_timezone(zone)?;
    let naive = parse_date_like(instant)?;
    render(&localize(naive, tz)?, "%Z")
}

// ── Comparison and arithmetic ───────────────────────────────────────────────

/// Strict `a < b` over parsed instants. Both sides accept the same
/// date-like shapes as [`convert`], including month precision (`2017-03`).
pub fn less_than(a: &str, b: &str) -> Result<bool> {
    Ok(parse_date_like(a)? < parse_date_like(b)?)
}

/// Whole units from `a` to `b` (negative when `b` is earlier).
///
/// Month-and-larger units count completed calendar units under clamped
/// month arithmetic; week and smaller divide the exact civil-time span.
pub fn diff(a: &str, b: &str, unit: IntervalUnit) -> Result<i64> {
    let from = parse_date_like(a)?;
    let to = parse_date_like(b)?;
    let span = to - from;
    Ok(match unit {
        IntervalUnit::Years => whole_months_between(from, to) / 12,
        IntervalUnit::Quarters => whole_months_between(from, to) / 3,
        IntervalUnit::Months => whole_months_between(from, to),
        IntervalUnit::Weeks => span.num_weeks(),
        IntervalUnit::Days => span.num_days(),
        IntervalUnit::Hours => span.num_hours(),
        IntervalUnit::Minutes => span.num_minutes(),
        IntervalUnit::Seconds => span.num_seconds(),
        IntervalUnit::Milliseconds => span.num_milliseconds(),
    })
}

/// Advance an instant by `magnitude` calendar units and render it with
/// `format` (canonical when `None`).
pub fn add(instant: &str, magnitude: u32, unit: IntervalUnit, format: Option<&str>) -> Result<String> {
    shift(instant, Sign::Plus, magnitude, unit, format)
}

/// Retreat an instant by `magnitude` calendar units and render it with
/// `format` (canonical when `None`).
pub fn subtract(instant: &str, magnitude: u32, unit: IntervalUnit, format: Option<&str>) -> Result<String> {
    shift(instant, Sign::Minus, magnitude, unit, format)
}

fn shift(instant: &str, sign: Sign, magnitude: u32, unit: IntervalUnit, format: Option<&str>) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let interval = Interval { sign, magnitude, unit };
    let naive = parse_date_like(instant)?;
    let shifted = interval
        .checked_add_to(naive)
        .ok_or_else(|| AuditError::OutOfRange(format!("'{instant}' {interval}")))?;
    render_naive(&shifted, format.unwrap_or(TIMESTAMP_FORMAT))
}

/// Whole calendar months from `a` to `b` under clamped month arithmetic.
fn whole_months_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    let mut n = (i64::from(b.year()) - i64::from(a.year())) * 12 + i64::from(b.month())
        - i64::from(a.month());
    let landed = |n: i64| -> Option<NaiveDateTime> {
        let interval = Interval {
            sign: if n >= 0 { Sign::Plus } else { Sign::Minus },
            magnitude: u32::try_from(n.unsigned_abs()).ok()?,
            unit: IntervalUnit::Months,
        };
        interval.checked_add_to(a)
    };
    if n >= 0 {
        while n > 0 && landed(n).is_none_or(|d| d > b) {
            n -= 1;
        }
    } else {
        while n < 0 && landed(n).is_none_or(|d| d < b) {
            n += 1;
        }
    }
    n
}

// ── Internal helpers ────────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a date-like string into civil (zone-free) time.
///
/// Accepted shapes: `YYYY-MM-DD HH:MM:SS` (optional fractional seconds,
/// optional `T` separator), `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, `YYYY-MM`
/// (first of the month), and US-order `M/D/YYYY` with unpadded fields.
/// Date-only shapes resolve to midnight.
pub(crate) fn parse_date_like(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    if let Some(date) = parse_year_month(s) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(AuditError::InvalidDatetime(format!("'{s}'")))
}

/// `YYYY-MM` month precision, resolved to the first of the month.
fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Parse an IANA timezone string into `Tz`.
pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| AuditError::InvalidTimezone(format!("'{s}'")))
}

/// Attach a zone to a civil time. Ambiguous wall-clock times (fall-back)
/// resolve to the earlier offset; times inside a spring-forward gap roll
/// past the gap.
pub(crate) fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        chrono::LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        chrono::LocalResult::None => (naive + chrono::Duration::hours(1))
            .and_local_timezone(tz)
            .single()
            .ok_or_else(|| {
                AuditError::InvalidDatetime(format!("nonexistent local time {naive} in {tz}"))
            }),
    }
}

/// Render a zoned instant, surfacing chrono's formatting failure as an
/// error instead of a panic.
pub(crate) fn render<T: TimeZone>(dt: &DateTime<T>, format: &str) -> Result<String>
where
    T::Offset: fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", dt.format(format))
        .map_err(|_| AuditError::InvalidFormat(format!("'{format}'")))?;
    Ok(out)
}

pub(crate) fn render_naive(dt: &NaiveDateTime, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(format))
        .map_err(|_| AuditError::InvalidFormat(format!("'{format}'")))?;
    Ok(out)
}

// ── Tests ───────────────────────────────────────────────────────────────────
