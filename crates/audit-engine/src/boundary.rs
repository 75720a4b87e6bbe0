//! Civil-time boundaries: day edges, unit boundaries, and month snapping.
//!
//! Every operation here interprets its input as wall-clock time in an input
//! zone, truncates or extends it to a civil boundary, and re-renders it in an
//! output zone. Half-open interval semantics are expressed at one-second
//! resolution: a day starts at `00:00:00` and ends at `23:59:59`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::{AuditError, Result};
use crate::instant::{localize, parse_date_like, parse_timezone, render, render_naive, TIMESTAMP_FORMAT};
use crate::interval::{Interval, IntervalUnit, Sign};

/// 23:59:59, the canonical end-of-day second.
pub(crate) fn end_of_day_time() -> NaiveTime {
    NaiveTime::MIN + Duration::seconds(86_399)
}

// ── Day edges ───────────────────────────────────────────────────────────────

/// Truncate an instant to `00:00:00` of its civil day in `zone_in` and
/// render the result in `zone_out`. Empty input returns an empty string.
pub fn start_of_day(instant: &str, zone_in: &str, zone_out: &str) -> Result<String> {
    at_day_edge(instant, zone_in, zone_out, NaiveTime::MIN)
}

/// Extend an instant to `23:59:59` of its civil day in `zone_in` and
/// render the result in `zone_out`. Empty input returns an empty string.
pub fn end_of_day(instant: &str, zone_in: &str, zone_out: &str) -> Result<String> {
    at_day_edge(instant, zone_in, zone_out, end_of_day_time())
}

fn at_day_edge(instant: &str, zone_in: &str, zone_out: &str, edge: NaiveTime) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let zone_in = parse_timezone(zone_in)?;
    let zone_out = parse_timezone(zone_out)?;
    let naive = parse_date_like(instant)?;
    let dt = localize(naive.date().and_time(edge), zone_in)?.with_timezone(&zone_out);
    render(&dt, TIMESTAMP_FORMAT)
}

// ── Unit boundaries ─────────────────────────────────────────────────────────

/// Truncate an instant to the start of the civil unit containing it
/// (first of the month, Monday of the week, top of the hour, ...) and
/// render with `format` (canonical when `None`). Zone-free: the instant is
/// treated as civil time throughout.
pub fn start_of(instant: &str, unit: IntervalUnit, format: Option<&str>) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let naive = parse_date_like(instant)?;
    let truncated = truncate(naive, unit)
        .ok_or_else(|| AuditError::OutOfRange(format!("'{instant}' start of {}", unit.as_str())))?;
    render_naive(&truncated, format.unwrap_or(TIMESTAMP_FORMAT))
}

/// Extend an instant to the last second of the civil unit containing it
/// and render with `format` (canonical when `None`).
pub fn end_of(instant: &str, unit: IntervalUnit, format: Option<&str>) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let naive = parse_date_like(instant)?;
    let extended = unit_end(naive, unit)
        .ok_or_else(|| AuditError::OutOfRange(format!("'{instant}' end of {}", unit.as_str())))?;
    render_naive(&extended, format.unwrap_or(TIMESTAMP_FORMAT))
}

fn truncate(t: NaiveDateTime, unit: IntervalUnit) -> Option<NaiveDateTime> {
    let date = t.date();
    Some(match unit {
        IntervalUnit::Years => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_time(NaiveTime::MIN),
        IntervalUnit::Quarters => {
            let quarter_start = ((date.month() - 1) / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), quarter_start, 1)?.and_time(NaiveTime::MIN)
        }
        IntervalUnit::Months => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_time(NaiveTime::MIN)
        }
        IntervalUnit::Weeks => {
            let back = i64::from(date.weekday().num_days_from_monday());
            (date - Duration::days(back)).and_time(NaiveTime::MIN)
        }
        IntervalUnit::Days => date.and_time(NaiveTime::MIN),
        IntervalUnit::Hours => date.and_time(NaiveTime::from_hms_opt(t.hour(), 0, 0)?),
        IntervalUnit::Minutes => date.and_time(NaiveTime::from_hms_opt(t.hour(), t.minute(), 0)?),
        IntervalUnit::Seconds => {
            date.and_time(NaiveTime::from_hms_opt(t.hour(), t.minute(), t.second())?)
        }
        IntervalUnit::Milliseconds => {
            let millis = (t.nanosecond() % 1_000_000_000) / 1_000_000;
            date.and_time(NaiveTime::from_hms_milli_opt(
                t.hour(),
                t.minute(),
                t.second(),
                millis,
            )?)
        }
    })
}

fn unit_end(t: NaiveDateTime, unit: IntervalUnit) -> Option<NaiveDateTime> {
    let start = truncate(t, unit)?;
    if matches!(unit, IntervalUnit::Seconds | IntervalUnit::Milliseconds) {
        return Some(start);
    }
    let one = Interval {
        sign: Sign::Plus,
        magnitude: 1,
        unit,
    };
    one.checked_add_to(start)?.checked_sub_signed(Duration::seconds(1))
}

// ── Month snapping ──────────────────────────────────────────────────────────

/// Snap an approximate seed date to the nearest civil month start, rendered
/// in UTC.
///
/// With `day` the civil day-of-month of `instant` in `zone_in`,
/// `lower = 1 + range`, and `upper = 31 - range`:
/// `day <= lower` snaps to the start of the current month (the seed was
/// meant for this month), `day >= upper` snaps to the start of the next
/// month (the seed arrived early), and anything strictly between is an
/// explicit date honored verbatim, converted to UTC. Empty input returns an
/// empty string.
pub fn clamp_to_month_boundary(instant: &str, range: u32, zone_in: &str) -> Result<String> {
    if instant.trim().is_empty() {
        return Ok(String::new());
    }
    let tz = parse_timezone(zone_in)?;
    let naive = parse_date_like(instant)?;
    let day = naive.day();
    let lower = 1 + range;
    let upper = 31u32.saturating_sub(range);

    let local = if day <= lower {
        month_start(naive.year(), naive.month())
            .ok_or_else(|| AuditError::OutOfRange(format!("'{instant}'")))?
    } else if day >= upper {
        let (year, month) = if naive.month() == 12 {
            (naive.year() + 1, 1)
        } else {
            (naive.year(), naive.month() + 1)
        };
        month_start(year, month).ok_or_else(|| AuditError::OutOfRange(format!("'{instant}'")))?
    } else {
        naive
    };

    let dt = localize(local, tz)?.with_timezone(&Utc);
    render(&dt, TIMESTAMP_FORMAT)
}

fn month_start(year: i32, month: u32) -> Option<NaiveDateTime> {
    Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN))
}

// ── Tests ───────────────────────────────────────────────────────────────────
