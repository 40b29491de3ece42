//! Error handling for Tally
//!
//! Defines the error kinds surfaced to callers and establishes a unified
//! Result type using anyhow for context chaining and error propagation.

use chrono::NaiveDate;
use thiserror::Error;

/// Core error types for account, balance and net worth operations
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("database error: {0}")]
    DbError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("balance entry not found: {0}")]
    BalanceNotFound(String),

    #[error("milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("balance history for account {0} is not in ascending date order")]
    UnorderedHistory(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tally operations
pub type Result<T> = anyhow::Result<T>;
