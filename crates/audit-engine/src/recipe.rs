//! Audit lifecycle timestamp derivation.
//!
//! One audit cycle is governed by six UTC instants derived from a single set
//! of inputs: an opening seed date, a client timezone, and calendar interval
//! rules for the open period, the licensure period, and an optional
//! carryover grace window. The derivation is a pipeline of pure functions
//! over immutable instants; each step consumes the previous step's UTC
//! value.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::boundary::end_of_day_time;
use crate::error::{AuditError, Result};
use crate::instant::{localize, parse_date_like, parse_timezone, render, to_iso_date, TIMESTAMP_FORMAT};
use crate::interval::{parse_interval, Interval};

// ── Recipe record ───────────────────────────────────────────────────────────

/// The six UTC instants governing one audit cycle.
///
/// Constructed atomically by [`compute_audit_recipe`]; a changed input
/// produces a new recipe, never an edit of an existing one. `carryover_max`
/// and `carryover_min` are present only when a carryover interval was
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecipe {
    /// Civil midnight (client timezone) at which the audit opens.
    pub opened: String,
    /// Last second of the last full civil day of the open interval.
    pub expired: String,
    /// Upper inclusive bound for accepted certificate completion dates.
    pub period_max: String,
    /// Lower inclusive bound for accepted certificate completion dates.
    pub period_min: String,
    /// Upper inclusive bound of the prior-period grace window.
    pub carryover_max: Option<String>,
    /// Lower inclusive bound of the prior-period grace window.
    pub carryover_min: Option<String>,
}

/// Options for [`compute_audit_recipe_with_options`].
#[derive(Debug, Clone)]
pub struct RecipeOptions {
    /// chrono format pattern used to render every timestamp in the recipe.
    pub timestamp_format: String,
}

impl Default for RecipeOptions {
    fn default() -> Self {
        Self {
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        }
    }
}

// ── Composer ────────────────────────────────────────────────────────────────

/// Derive the audit recipe for one cycle.
///
/// Renders with the canonical timestamp format. For a custom rendering
/// format use [`compute_audit_recipe_with_options`].
///
/// # Arguments
///
/// * `opened` — seed date for the cycle, any accepted date-like shape;
///   time-of-day and zone are discarded
/// * `interval_open` — length of the open period (e.g. `"1 MONTHS"`)
/// * `interval_licet` — length of the licensure window, counted backward
///   from the period ceiling
/// * `interval_carryover` — optional grace-window length; `None` leaves the
///   carryover bounds absent
/// * `timezone` — IANA name of the client timezone
///
/// Unparseable interval text degrades to a zero offset (the affected
/// calendar step becomes a no-op); an empty `opened` yields a recipe of
/// empty strings. An unknown timezone is a hard error.
///
/// # Errors
///
/// [`AuditError::InvalidTimezone`], [`AuditError::InvalidDatetime`], or
/// [`AuditError::OutOfRange`] on calendar overflow.
///
/// # Examples
///
/// ```
/// use audit_engine::compute_audit_recipe;
///
/// let recipe = compute_audit_recipe(
///     "3/1/2017",
///     "1 MONTHS",
///     "1 MONTHS",
///     Some("1 MONTHS"),
///     "US/Central",
/// )
/// .unwrap();
///
/// assert_eq!(recipe.opened, "2017-03-01 06:00:00");
/// assert_eq!(recipe.expired, "2017-04-01 04:59:59");
/// assert_eq!(recipe.period_min, recipe.opened);
/// assert_eq!(recipe.carryover_max.as_deref(), Some("2017-03-01 05:59:59"));
/// ```
pub fn compute_audit_recipe(
    opened: &str,
    interval_open: &str,
    interval_licet: &str,
    interval_carryover: Option<&str>,
    timezone: &str,
) -> Result<AuditRecipe> {
    compute_audit_recipe_with_options(
        opened,
        interval_open,
        interval_licet,
        interval_carryover,
        timezone,
        &RecipeOptions::default(),
    )
}

/// [`compute_audit_recipe`] with explicit rendering options.
pub fn compute_audit_recipe_with_options(
    opened: &str,
    interval_open: &str,
    interval_licet: &str,
    interval_carryover: Option<&str>,
    timezone: &str,
    options: &RecipeOptions,
) -> Result<AuditRecipe> {
    let tz = parse_timezone(timezone)?;
    let format = options.timestamp_format.as_str();

    let opened_date = to_iso_date(opened)?;
    if opened_date.is_empty() {
        return Ok(AuditRecipe {
            opened: String::new(),
            expired: String::new(),
            period_max: String::new(),
            period_min: String::new(),
            carryover_max: interval_carryover.map(|_| String::new()),
            carryover_min: interval_carryover.map(|_| String::new()),
        });
    }

    // Unparseable interval text degrades to the zero offset; the calendar
    // steps below become no-ops rather than faults.
    let open = parse_interval(interval_open).unwrap_or_default();
    let licet = parse_interval(interval_licet).unwrap_or_default();

    let opened_utc = opened_instant(&opened_date, tz)?;
    let expired = expired_instant(opened_utc, &open, tz)?;
    let period_max = expired;
    let period_min = window_floor(period_max, &licet, tz)?;

    let carryover = match interval_carryover {
        Some(text) => {
            let carry = parse_interval(text).unwrap_or_default();
            let carryover_max = period_min - Duration::seconds(1);
            let carryover_min = window_floor(carryover_max, &carry, tz)?;
            Some((carryover_max, carryover_min))
        }
        None => None,
    };
    let (carryover_max, carryover_min) = match carryover {
        Some((max, min)) => (Some(render(&max, format)?), Some(render(&min, format)?)),
        None => (None, None),
    };

    Ok(AuditRecipe {
        opened: render(&opened_utc, format)?,
        expired: render(&expired, format)?,
        period_max: render(&period_max, format)?,
        period_min: render(&period_min, format)?,
        carryover_max,
        carryover_min,
    })
}

// ── Pipeline steps ──────────────────────────────────────────────────────────

/// The audit opens at civil midnight of its seed date in the client zone.
fn opened_instant(opened_date: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let midnight = parse_date_like(opened_date)?.date().and_time(NaiveTime::MIN);
    Ok(localize(midnight, tz)?.with_timezone(&Utc))
}

/// End of the last full civil day of the open interval.
fn expired_instant(opened: DateTime<Utc>, interval: &Interval, tz: Tz) -> Result<DateTime<Utc>> {
    let local = opened.with_timezone(&tz).naive_local();
    let rolled = interval
        .checked_add_to(local)
        .ok_or_else(|| AuditError::OutOfRange(format!("{local} {interval}")))?;
    // The interval lands on the midnight that starts the next period; step
    // back one civil day first so end-of-day falls on the last full day
    // inside the interval rather than one day past it.
    let last_day = rolled
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(|| AuditError::OutOfRange(format!("{rolled} - 1 day")))?;
    let end = last_day.date().and_time(end_of_day_time());
    Ok(localize(end, tz)?.with_timezone(&Utc))
}

/// Lower bound of a window whose inclusive upper bound is `upper`: roll one
/// second forward onto the period boundary, then subtract the interval.
/// Subtracting calendar units from one-second-before-a-boundary instead
/// would pick up month-length artifacts.
fn window_floor(upper: DateTime<Utc>, interval: &Interval, tz: Tz) -> Result<DateTime<Utc>> {
    let boundary = (upper + Duration::seconds(1)).with_timezone(&tz).naive_local();
    let floor = interval
        .checked_sub_from(boundary)
        .ok_or_else(|| AuditError::OutOfRange(format!("{boundary} {interval}")))?;
    Ok(localize(floor, tz)?.with_timezone(&Utc))
}

// ── Tests ───────────────────────────────────────────────────────────────────
