//! # audit-engine
//!
//! Deterministic audit period computation.
//!
//! Given an audit's opening date, a client timezone, and a set of calendar
//! interval rules, the engine derives the canonical UTC timestamps that
//! govern one recurring compliance audit cycle: when it opens, when it
//! expires, the inclusive bounds within which a certificate completion date
//! is accepted, and an optional prior-period carryover grace window.
//!
//! All functions are pure and synchronous, take explicit inputs (no system
//! clock access), and compute in *calendar* units: adding "1 month" to
//! January 31 lands on February 28, not March 3. Instants cross the API as
//! text in the canonical `YYYY-MM-DD HH:mm:ss` format, and every persisted
//! timestamp is UTC even though intermediate computation happens in a named
//! civil timezone.
//!
//! ## Modules
//!
//! - [`interval`] — Parse signed calendar intervals (`"1 MONTH"`, `"- 2 WEEKS"`) and apply them
//! - [`instant`] — Timezone conversion, date normalization, validation, and one-shot arithmetic
//! - [`boundary`] — Day edges, civil unit boundaries, and month-start snapping
//! - [`recipe`] — The audit recipe composer
//! - [`error`] — Error types

pub mod boundary;
pub mod error;
pub mod instant;
pub mod interval;
pub mod recipe;

pub use boundary::{clamp_to_month_boundary, end_of, end_of_day, start_of, start_of_day};
pub use error::AuditError;
pub use instant::{
    add, convert, diff, is_valid_date, less_than, subtract, to_iso_date, zone_abbr,
    TIMESTAMP_FORMAT, TIMESTAMP_FORMAT_ZONED,
};
pub use interval::{parse_interval, Interval, IntervalUnit, Sign};
pub use recipe::{
    compute_audit_recipe, compute_audit_recipe_with_options, AuditRecipe, RecipeOptions,
};
