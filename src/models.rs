/// Data models for the scanner reservation system.
///
/// This module defines the core data structures used throughout the system:
/// - ClinicDay: the two weekdays the scanner is available
/// - Appointment: a reserved scanner session
/// - CancellationRequest: free-text message sent by a patient

use crate::error::{BookingError, RowError};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::fmt;

/// Stored timestamp layout. Parsing also accepts a few legacy variants.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_DATETIME_FORMATS: &[&str] = &[DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// The clinic's operating weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClinicDay {
    Tuesday,
    Thursday,
}

impl ClinicDay {
    pub const ALL: [ClinicDay; 2] = [ClinicDay::Tuesday, ClinicDay::Thursday];

    /// The clinic day a calendar date falls on, if the clinic is open that day.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Tue => Some(ClinicDay::Tuesday),
            Weekday::Thu => Some(ClinicDay::Thursday),
            _ => None,
        }
    }

    /// Convert a stored day name to a ClinicDay.
    pub fn from_string(value: &str) -> Result<Self, RowError> {
        match value.trim().to_lowercase().as_str() {
            "tuesday" => Ok(ClinicDay::Tuesday),
            "thursday" => Ok(ClinicDay::Thursday),
            _ => Err(RowError::Day(value.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClinicDay::Tuesday => "Tuesday",
            ClinicDay::Thursday => "Thursday",
        }
    }
}

impl fmt::Display for ClinicDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, RowError> {
    let value = value.trim();
    ACCEPTED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| RowError::Timestamp(value.to_string()))
}

/// Represents one reserved scanner session.
///
/// Appointments have no identifier of their own; a booking is identified by
/// its day and start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub day: ClinicDay,
    pub start_time: NaiveDateTime,
    pub patient_name: String,
    pub contact: String,
}

impl Appointment {
    /// Create a new appointment with validation.
    pub fn new(
        day: ClinicDay,
        start_time: NaiveDateTime,
        patient_name: String,
        contact: String,
    ) -> Result<Self, BookingError> {
        if patient_name.trim().is_empty() || contact.trim().is_empty() {
            return Err(BookingError::Validation(
                "Please enter both your name and contact number.".to_string(),
            ));
        }

        Ok(Appointment {
            day,
            start_time,
            patient_name,
            contact,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Whether this booking sits on the given clinic day and calendar date.
    pub fn falls_on(&self, day: ClinicDay, date: NaiveDate) -> bool {
        self.day == day && self.date() == date
    }
}

/// A free-text cancellation message. Name and contact are embedded in the
/// text by convention only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationRequest(String);

impl CancellationRequest {
    pub fn new(message: String) -> Result<Self, BookingError> {
        if message.trim().is_empty() {
            return Err(BookingError::Validation(
                "Please enter a valid message to send.".to_string(),
            ));
        }
        Ok(CancellationRequest(message))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CancellationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
