//! # Error Types
//!
//! Typed failures for the scheduling core. Rate-limit exhaustion is not an
//! error: it is reported through `RateLimitResult::success`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Split polar-region failures out of InvalidInput
//! - 1.0.0: Initial release

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Coordinates, timezone or madhab could not be accepted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The sun never reaches a required angle on this date at this latitude.
    #[error("Prayer times undefined on {date} at latitude {latitude:.4}: {reason}")]
    PrayerTimesUndefined {
        date: NaiveDate,
        latitude: f64,
        reason: String,
    },
}

impl ScheduleError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ScheduleError::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ScheduleError::InvalidInput(_))
    }
}
