//! Error types for audit-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Datetime out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
