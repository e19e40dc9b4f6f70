/// Clinic state management.
///
/// `ClinicBook` owns the in-memory appointments and cancellation requests
/// together with the store they are mirrored to. Every mutation goes
/// through the planner checks first and is saved before the call returns.

use crate::error::BookingError;
use crate::models::{Appointment, CancellationRequest, ClinicDay};
use crate::planner;
use crate::store::Store;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

pub struct ClinicBook<S: Store> {
    store: S,
    appointments: Vec<Appointment>,
    cancellations: Vec<CancellationRequest>,
    dropped_rows: usize,
}

impl<S: Store> ClinicBook<S> {
    /// Load the current state from the store.
    pub fn open(store: S) -> Result<Self, BookingError> {
        let snapshot = store.load()?;
        if snapshot.dropped_rows > 0 {
            warn!("Ignored {} unreadable stored rows", snapshot.dropped_rows);
        }

        Ok(ClinicBook {
            store,
            appointments: snapshot.appointments,
            cancellations: snapshot.cancellations,
            dropped_rows: snapshot.dropped_rows,
        })
    }

    /// Number of stored rows dropped when the book was opened.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    fn clinic_day(date: NaiveDate) -> Result<ClinicDay, BookingError> {
        ClinicDay::from_date(date).ok_or(BookingError::ClosedDay(date))
    }

    /// Get all appointments for one clinic day, sorted by time.
    pub fn appointments_for(&self, day: ClinicDay) -> Vec<&Appointment> {
        let mut appointments: Vec<&Appointment> =
            self.appointments.iter().filter(|apt| apt.day == day).collect();
        appointments.sort_by_key(|apt| apt.start_time);
        appointments
    }

    pub fn available_slots(&self, date: NaiveDate) -> Result<Vec<NaiveDateTime>, BookingError> {
        let day = Self::clinic_day(date)?;
        Ok(planner::available_slots(day, date, &self.appointments))
    }

    pub fn booked_slots(&self, date: NaiveDate) -> Result<Vec<NaiveDateTime>, BookingError> {
        let day = Self::clinic_day(date)?;
        Ok(planner::booked_slots(day, date, &self.appointments))
    }

    pub fn is_full(&self, date: NaiveDate) -> Result<bool, BookingError> {
        let day = Self::clinic_day(date)?;
        Ok(planner::is_full(day, date, &self.appointments))
    }

    /// Book a slot for a patient and persist it.
    pub fn reserve(
        &mut self,
        date: NaiveDate,
        slot: NaiveDateTime,
        name: &str,
        contact: &str,
    ) -> Result<Appointment, BookingError> {
        let day = Self::clinic_day(date)?;
        let appointment = planner::reserve(day, date, slot, name, contact, &self.appointments)?;

        self.appointments.push(appointment.clone());
        if let Err(e) = self.store.save_appointments(&self.appointments) {
            self.appointments.pop();
            return Err(e.into());
        }

        info!(
            "Reserved {} {} for {}",
            day,
            slot.format("%Y-%m-%d %H:%M"),
            appointment.patient_name
        );
        Ok(appointment)
    }

    /// Remove a booked appointment and persist the change.
    pub fn remove_appointment(
        &mut self,
        date: NaiveDate,
        slot: NaiveDateTime,
    ) -> Result<Appointment, BookingError> {
        let day = Self::clinic_day(date)?;
        let target = planner::remove(day, date, slot, &self.appointments)?;

        let index = self
            .appointments
            .iter()
            .position(|apt| *apt == target)
            .ok_or(BookingError::NotFound { date, slot })?;
        let removed = self.appointments.remove(index);

        if let Err(e) = self.store.save_appointments(&self.appointments) {
            self.appointments.insert(index, removed);
            return Err(e.into());
        }

        info!("Removed {} {} appointment", day, slot.format("%Y-%m-%d %H:%M"));
        Ok(removed)
    }

    /// Cancellation requests in submission order.
    pub fn cancellations(&self) -> &[CancellationRequest] {
        &self.cancellations
    }

    pub fn submit_cancellation(&mut self, message: &str) -> Result<(), BookingError> {
        let request = CancellationRequest::new(message.to_string())?;

        self.cancellations.push(request);
        if let Err(e) = self.store.save_cancellations(&self.cancellations) {
            self.cancellations.pop();
            return Err(e.into());
        }

        info!("Cancellation request received ({} pending)", self.cancellations.len());
        Ok(())
    }

    /// Delete a cancellation request by its zero-based position.
    pub fn delete_cancellation(&mut self, index: usize) -> Result<CancellationRequest, BookingError> {
        if index >= self.cancellations.len() {
            return Err(BookingError::CancellationNotFound(index + 1));
        }
        let removed = self.cancellations.remove(index);

        if let Err(e) = self.store.save_cancellations(&self.cancellations) {
            self.cancellations.insert(index, removed);
            return Err(e.into());
        }

        info!("Deleted cancellation request {}", index + 1);
        Ok(removed)
    }
}
