//! Signed calendar intervals: parsing and checked arithmetic.
//!
//! An interval is a human-readable offset such as `"1 MONTH"` or
//! `"- 2 WEEKS"`, applied in *calendar* units rather than fixed durations.
//! Month-and-larger units clamp to the end of the target month
//! (January 31 plus one month is February 28), so applying an interval and
//! then reversing it is not an identity near month ends.

use std::fmt;

use chrono::{Duration, Months, NaiveDateTime};
use serde::Serialize;

// ── Sign ────────────────────────────────────────────────────────────────────

/// Direction of a calendar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    fn factor(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        })
    }
}

// ── Unit ────────────────────────────────────────────────────────────────────

/// Calendar unit of an interval, in its arithmetic (plural) form.
///
/// Year, quarter, and month arithmetic is calendar-aware with end-of-month
/// clamping; week and smaller are exact civil-time offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum IntervalUnit {
    Years,
    Quarters,
    Months,
    Weeks,
    #[default]
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl IntervalUnit {
    /// Parse a unit token, case-insensitive, singular or plural.
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "year" | "years" => Some(IntervalUnit::Years),
            "quarter" | "quarters" => Some(IntervalUnit::Quarters),
            "month" | "months" => Some(IntervalUnit::Months),
            "week" | "weeks" => Some(IntervalUnit::Weeks),
            "day" | "days" => Some(IntervalUnit::Days),
            "hour" | "hours" => Some(IntervalUnit::Hours),
            "minute" | "minutes" => Some(IntervalUnit::Minutes),
            "second" | "seconds" => Some(IntervalUnit::Seconds),
            "millisecond" | "milliseconds" => Some(IntervalUnit::Milliseconds),
            _ => None,
        }
    }

    /// The normalized plural name (`"months"`, `"days"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalUnit::Years => "years",
            IntervalUnit::Quarters => "quarters",
            IntervalUnit::Months => "months",
            IntervalUnit::Weeks => "weeks",
            IntervalUnit::Days => "days",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Seconds => "seconds",
            IntervalUnit::Milliseconds => "milliseconds",
        }
    }
}

// ── Interval ────────────────────────────────────────────────────────────────

/// A signed, unit-typed calendar offset (e.g. `+1 months`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Interval {
    pub sign: Sign,
    pub magnitude: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    /// The zero offset (`+0 days`), a calendar no-op.
    pub fn zero() -> Self {
        Interval::default()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    fn signed_magnitude(&self) -> i64 {
        self.sign.factor() * i64::from(self.magnitude)
    }

    /// Advance `t` by this interval. `None` on calendar overflow.
    pub fn checked_add_to(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        apply(t, self.signed_magnitude(), self.unit)
    }

    /// Retreat `t` by this interval. `None` on calendar overflow.
    pub fn checked_sub_from(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        apply(t, -self.signed_magnitude(), self.unit)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.sign, self.magnitude, self.unit.as_str())
    }
}

/// Shift `t` by `n` units of `unit`, clamping month-and-larger units to the
/// end of the target month.
fn apply(t: NaiveDateTime, n: i64, unit: IntervalUnit) -> Option<NaiveDateTime> {
    match unit {
        IntervalUnit::Years => shift_months(t, n.checked_mul(12)?),
        IntervalUnit::Quarters => shift_months(t, n.checked_mul(3)?),
        IntervalUnit::Months => shift_months(t, n),
        IntervalUnit::Weeks => t.checked_add_signed(Duration::try_weeks(n)?),
        IntervalUnit::Days => t.checked_add_signed(Duration::try_days(n)?),
        IntervalUnit::Hours => t.checked_add_signed(Duration::try_hours(n)?),
        IntervalUnit::Minutes => t.checked_add_signed(Duration::try_minutes(n)?),
        IntervalUnit::Seconds => t.checked_add_signed(Duration::try_seconds(n)?),
        IntervalUnit::Milliseconds => t.checked_add_signed(Duration::try_milliseconds(n)?),
    }
}

fn shift_months(t: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        t.checked_add_months(span)
    } else {
        t.checked_sub_months(span)
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a human-readable interval expression.
///
/// Accepted shapes, split on whitespace:
/// - empty / all-whitespace → the `+0 days` default;
/// - `"<magnitude> <unit>"` → implicit `+` sign;
/// - `"<sign> <magnitude> <unit>"` with sign `+` or `-`.
///
/// Returns `None` for anything else: a lone token, an unrecognized sign, a
/// non-numeric magnitude, or an unknown unit. `None` is the discriminated
/// "invalid" value; callers that want degradation map it to
/// [`Interval::zero`] explicitly rather than relying on the parser to coerce.
///
/// # Examples
///
/// ```
/// use audit_engine::{parse_interval, IntervalUnit, Sign};
///
/// let iv = parse_interval("1 YEAR").unwrap();
/// assert_eq!(iv.sign, Sign::Plus);
/// assert_eq!(iv.magnitude, 1);
/// assert_eq!(iv.unit, IntervalUnit::Years);
///
/// assert!(parse_interval("fortnight").is_none());
/// ```
pub fn parse_interval(text: &str) -> Option<Interval> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Some(Interval::zero());
    }
    let (sign_token, magnitude_token, unit_token) = match tokens.len() {
        1 => return None,
        2 => ("+", tokens[0], tokens[1]),
        _ => (tokens[0], tokens[1], tokens[2]),
    };
    let sign = match sign_token {
        "+" => Sign::Plus,
        "-" => Sign::Minus,
        _ => return None,
    };
    let magnitude: u32 = magnitude_token.parse().ok()?;
    let unit = IntervalUnit::parse(unit_token)?;
    Some(Interval {
        sign,
        magnitude,
        unit,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_is_zero_days() {
        let iv = parse_interval("").unwrap();
        assert_eq!(iv.sign, Sign::Plus);
        assert_eq!(iv.magnitude, 0);
        assert_eq!(iv.unit, IntervalUnit::Days);
        assert!(iv.is_zero());
    }

    #[test]
    fn test_whitespace_only_is_zero_days() {
        assert_eq!(parse_interval("   ").unwrap(), Interval::zero());
    }

    #[test]
    fn test_two_tokens_default_plus() {
        let iv = parse_interval("1 YEAR").unwrap();
        assert_eq!(iv.sign, Sign::Plus);
        assert_eq!(iv.magnitude, 1);
        assert_eq!(iv.unit, IntervalUnit::Years);
    }

    #[test]
    fn test_plural_unit() {
        let iv = parse_interval("1 MONTHS").unwrap();
        assert_eq!(iv.unit, IntervalUnit::Months);
    }

    #[test]
    fn test_three_tokens_explicit_minus() {
        let iv = parse_interval("- 2 WEEKS").unwrap();
        assert_eq!(iv.sign, Sign::Minus);
        assert_eq!(iv.magnitude, 2);
        assert_eq!(iv.unit, IntervalUnit::Weeks);
    }

    #[test]
    fn test_three_tokens_explicit_plus() {
        let iv = parse_interval("+ 3 quarters").unwrap();
        assert_eq!(iv.sign, Sign::Plus);
        assert_eq!(iv.unit, IntervalUnit::Quarters);
    }

    #[test]
    fn test_single_token_is_invalid() {
        assert!(parse_interval("1").is_none());
    }

    #[test]
    fn test_bad_sign_is_invalid() {
        assert!(parse_interval("x 2 days").is_none());
    }

    #[test]
    fn test_bad_magnitude_is_invalid() {
        assert!(parse_interval("two days").is_none());
    }

    #[test]
    fn test_unknown_unit_is_invalid() {
        assert!(parse_interval("1 fortnight").is_none());
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let iv = parse_interval("+ 1 month of grace").unwrap();
        assert_eq!(iv.magnitude, 1);
        assert_eq!(iv.unit, IntervalUnit::Months);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let iv = parse_interval("- 2 WEEKS").unwrap();
        assert_eq!(parse_interval(&iv.to_string()), Some(iv));
    }

    #[test]
    fn test_month_add_clamps_to_month_end() {
        let iv = parse_interval("1 MONTH").unwrap();
        assert_eq!(iv.checked_add_to(at(2017, 1, 31)), Some(at(2017, 2, 28)));
        assert_eq!(iv.checked_add_to(at(2016, 1, 31)), Some(at(2016, 2, 29)));
    }

    #[test]
    fn test_negative_sign_inverts_direction() {
        let iv = parse_interval("- 1 MONTH").unwrap();
        assert_eq!(iv.checked_add_to(at(2017, 3, 15)), Some(at(2017, 2, 15)));
        assert_eq!(iv.checked_sub_from(at(2017, 3, 15)), Some(at(2017, 4, 15)));
    }

    #[test]
    fn test_year_is_twelve_months() {
        let iv = parse_interval("2 YEARS").unwrap();
        assert_eq!(iv.checked_add_to(at(2016, 2, 29)), Some(at(2018, 2, 28)));
    }

    #[test]
    fn test_quarter_is_three_months() {
        let iv = parse_interval("1 QUARTER").unwrap();
        assert_eq!(iv.checked_add_to(at(2017, 1, 15)), Some(at(2017, 4, 15)));
    }

    #[test]
    fn test_week_and_day_are_exact() {
        let days = parse_interval("10 DAYS").unwrap();
        assert_eq!(days.checked_add_to(at(2017, 3, 1)), Some(at(2017, 3, 11)));
        let weeks = parse_interval("2 WEEKS").unwrap();
        assert_eq!(weeks.checked_sub_from(at(2017, 3, 15)), Some(at(2017, 3, 1)));
    }

    #[test]
    fn test_zero_interval_is_no_op() {
        let t = at(2017, 3, 1);
        assert_eq!(Interval::zero().checked_add_to(t), Some(t));
        assert_eq!(Interval::zero().checked_sub_from(t), Some(t));
    }
}
