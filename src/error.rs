//! Error types for the eventcast library.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors that can occur while loading, aggregating, detecting or forecasting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// No rows remain after filtering.
    #[error("no data for the current selection")]
    EmptySeries,

    /// Too few observations to fit a forecasting model.
    #[error("insufficient history: need at least {needed} days, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Candidate date for an event query is missing or malformed.
    #[error("invalid date selection: {0}")]
    InvalidDateSelection(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Date-related error (unparseable, non-monotonic, duplicated).
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Computation error (e.g., singular design matrix).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// No holiday rules for the requested country code.
    #[error("unknown holiday country: {0}")]
    UnknownHolidayCountry(String),

    /// Failure in the underlying data source.
    #[error("data source error: {0}")]
    Source(String),
}

impl EventError {
    /// Whether the error is a recoverable data condition rather than a
    /// configuration or I/O failure.
    pub fn is_data_condition(&self) -> bool {
        matches!(
            self,
            EventError::EmptySeries
                | EventError::InsufficientHistory { .. }
                | EventError::InvalidDateSelection(_)
        )
    }
}

impl From<rusqlite::Error> for EventError {
    fn from(err: rusqlite::Error) -> Self {
        EventError::Source(err.to_string())
    }
}
