/// Error types for the reservation system.
///
/// `BookingError` is what the user-facing flows report. Store failures are
/// wrapped into it; row parse failures never leave the store module.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("The time slot {} is already reserved. Please select another.", .0.format("%Y-%m-%d %H:%M"))]
    Collision(NaiveDateTime),

    #[error("Maximum number of appointments reached for {0}.")]
    Capacity(NaiveDate),

    #[error("No appointment found on {date} at {}.", .slot.format("%H:%M"))]
    NotFound {
        date: NaiveDate,
        slot: NaiveDateTime,
    },

    #[error("No cancellation request number {0}.")]
    CancellationNotFound(usize),

    #[error("The clinic is open only on Tuesdays and Thursdays ({0} is a {})", .0.format("%A"))]
    ClosedDay(NaiveDate),

    #[error("Storage error: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Why a stored row was dropped on load.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("unknown clinic day '{0}'")]
    Day(String),

    #[error("unparseable timestamp '{0}'")]
    Timestamp(String),

    #[error("text is not valid UTF-8")]
    Encoding,

    #[error("empty cancellation message")]
    EmptyMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_message_names_the_slot() {
        let slot = NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let msg = BookingError::Collision(slot).to_string();
        assert!(msg.contains("2024-10-01 09:00"));
    }

    #[test]
    fn closed_day_names_the_weekday() {
        let monday = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        let msg = BookingError::ClosedDay(monday).to_string();
        assert!(msg.contains("Monday"));
    }
}
