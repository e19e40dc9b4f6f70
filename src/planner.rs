/// Slot planning for the scanner clinic.
///
/// Opening hours are fixed: two 30-minute slots per clinic day. Tuesday
/// starts at 09:00. Thursday alternates with the ISO week number, starting
/// at 11:00 on even weeks and 09:00 on odd weeks.
///
/// Everything here is a pure function over the current bookings. Nothing
/// is persisted and nothing is locked: `reserve` re-checks availability at
/// call time, which narrows but does not close the window between listing
/// slots and committing a booking.

use crate::error::BookingError;
use crate::models::{Appointment, ClinicDay};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Maximum number of appointments per clinic day.
pub const DAILY_CAPACITY: usize = 2;

pub const SLOT_MINUTES: i64 = 30;

/// Opening time for a clinic day on a given date.
pub fn schedule_start(day: ClinicDay, date: NaiveDate) -> NaiveTime {
    let hours = match day {
        ClinicDay::Tuesday => 9,
        ClinicDay::Thursday if date.iso_week().week() % 2 == 0 => 11,
        ClinicDay::Thursday => 9,
    };
    NaiveTime::MIN + Duration::hours(hours)
}

/// Every bookable slot on the date, occupied or not, in chronological order.
pub fn candidate_slots(day: ClinicDay, date: NaiveDate) -> Vec<NaiveDateTime> {
    let start = date.and_time(schedule_start(day, date));
    (0..DAILY_CAPACITY as i64)
        .map(|i| start + Duration::minutes(SLOT_MINUTES * i))
        .collect()
}

fn bookings_on<'a>(
    day: ClinicDay,
    date: NaiveDate,
    existing: &'a [Appointment],
) -> impl Iterator<Item = &'a Appointment> {
    existing.iter().filter(move |apt| apt.falls_on(day, date))
}

/// Slots on the date not yet taken by an existing appointment.
pub fn available_slots(
    day: ClinicDay,
    date: NaiveDate,
    existing: &[Appointment],
) -> Vec<NaiveDateTime> {
    candidate_slots(day, date)
        .into_iter()
        .filter(|slot| !bookings_on(day, date, existing).any(|apt| apt.start_time == *slot))
        .collect()
}

/// Booked start times on the date, chronological.
pub fn booked_slots(day: ClinicDay, date: NaiveDate, existing: &[Appointment]) -> Vec<NaiveDateTime> {
    let mut slots: Vec<NaiveDateTime> = bookings_on(day, date, existing)
        .map(|apt| apt.start_time)
        .collect();
    slots.sort();
    slots
}

pub fn is_full(day: ClinicDay, date: NaiveDate, existing: &[Appointment]) -> bool {
    bookings_on(day, date, existing).count() >= DAILY_CAPACITY
}

/// Validate a reservation against the current bookings.
///
/// Returns the new appointment without storing it.
pub fn reserve(
    day: ClinicDay,
    date: NaiveDate,
    slot: NaiveDateTime,
    name: &str,
    contact: &str,
    existing: &[Appointment],
) -> Result<Appointment, BookingError> {
    let appointment = Appointment::new(day, slot, name.to_string(), contact.to_string())?;

    if is_full(day, date, existing) {
        return Err(BookingError::Capacity(date));
    }

    if bookings_on(day, date, existing).any(|apt| apt.start_time == slot) {
        return Err(BookingError::Collision(slot));
    }

    if !candidate_slots(day, date).contains(&slot) {
        return Err(BookingError::Validation(format!(
            "{} is not a bookable time on {} {}.",
            slot.format("%Y-%m-%d %H:%M"),
            day,
            date
        )));
    }

    Ok(appointment)
}

/// Find the booking to delete for the given day, date and start time.
pub fn remove(
    day: ClinicDay,
    date: NaiveDate,
    slot: NaiveDateTime,
    existing: &[Appointment],
) -> Result<Appointment, BookingError> {
    bookings_on(day, date, existing)
        .find(|apt| apt.start_time == slot)
        .cloned()
        .ok_or(BookingError::NotFound { date, slot })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    // 2024-10-01 is a Tuesday in ISO week 40; 2024-10-03 the Thursday of it.
    fn tuesday() -> NaiveDate {
        date(2024, 10, 1)
    }

    fn even_thursday() -> NaiveDate {
        date(2024, 10, 3)
    }

    fn odd_thursday() -> NaiveDate {
        date(2024, 10, 10)
    }

    fn booking(day: ClinicDay, slot: NaiveDateTime, name: &str) -> Appointment {
        Appointment::new(day, slot, name.to_string(), "123".to_string()).unwrap()
    }

    #[test]
    fn tuesday_always_opens_at_nine() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(schedule_start(ClinicDay::Tuesday, tuesday()), nine);
        assert_eq!(schedule_start(ClinicDay::Tuesday, date(2024, 10, 8)), nine);
    }

    #[test]
    fn thursday_alternates_with_iso_week() {
        assert_eq!(even_thursday().iso_week().week(), 40);
        assert_eq!(
            schedule_start(ClinicDay::Thursday, even_thursday()),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap()
        );
        assert_eq!(odd_thursday().iso_week().week(), 41);
        assert_eq!(
            schedule_start(ClinicDay::Thursday, odd_thursday()),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn thursday_uses_iso_week_across_year_boundary() {
        // 2026-01-01 is a Thursday in ISO week 1, 2020-12-31 in ISO week 53.
        let new_year = date(2026, 1, 1);
        assert_eq!(candidate_slots(ClinicDay::Thursday, new_year)[0], at(new_year, 9, 0));
        let old_year = date(2020, 12, 31);
        assert_eq!(old_year.iso_week().week(), 53);
        assert_eq!(candidate_slots(ClinicDay::Thursday, old_year)[0], at(old_year, 9, 0));
    }

    #[test]
    fn empty_tuesday_offers_both_slots() {
        let d = tuesday();
        assert_eq!(
            available_slots(ClinicDay::Tuesday, d, &[]),
            vec![at(d, 9, 0), at(d, 9, 30)]
        );
    }

    #[test]
    fn empty_even_thursday_offers_late_slots() {
        let d = even_thursday();
        assert_eq!(
            available_slots(ClinicDay::Thursday, d, &[]),
            vec![at(d, 11, 0), at(d, 11, 30)]
        );
    }

    #[test]
    fn available_slots_are_bounded_and_spaced() {
        let mut d = date(2024, 1, 1);
        while d < date(2025, 1, 1) {
            if let Some(day) = ClinicDay::from_date(d) {
                let slots = available_slots(day, d, &[]);
                assert!(slots.len() <= DAILY_CAPACITY);
                let base = d.and_time(schedule_start(day, d));
                for (i, slot) in slots.iter().enumerate() {
                    assert_eq!(*slot - base, Duration::minutes(SLOT_MINUTES * i as i64));
                }
            }
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn booked_slot_is_filtered_out() {
        let d = tuesday();
        let existing = vec![booking(ClinicDay::Tuesday, at(d, 9, 0), "A")];
        assert_eq!(available_slots(ClinicDay::Tuesday, d, &existing), vec![at(d, 9, 30)]);
    }

    #[test]
    fn bookings_on_other_dates_do_not_interfere() {
        let d = tuesday();
        let next_week = date(2024, 10, 8);
        let existing = vec![booking(ClinicDay::Tuesday, at(next_week, 9, 0), "A")];
        assert_eq!(available_slots(ClinicDay::Tuesday, d, &existing).len(), 2);
    }

    #[test]
    fn fully_booked_date_has_no_slots() {
        let d = tuesday();
        let existing = vec![
            booking(ClinicDay::Tuesday, at(d, 9, 0), "A"),
            booking(ClinicDay::Tuesday, at(d, 9, 30), "B"),
        ];
        assert!(available_slots(ClinicDay::Tuesday, d, &existing).is_empty());
        assert!(is_full(ClinicDay::Tuesday, d, &existing));
    }

    #[test]
    fn reserve_then_collide() {
        let d = tuesday();
        let mut existing = Vec::new();

        let apt = reserve(ClinicDay::Tuesday, d, at(d, 9, 0), "A", "123", &existing).unwrap();
        assert_eq!(apt.start_time, at(d, 9, 0));
        assert_eq!(apt.patient_name, "A");
        existing.push(apt);

        assert_eq!(available_slots(ClinicDay::Tuesday, d, &existing), vec![at(d, 9, 30)]);

        let again = reserve(ClinicDay::Tuesday, d, at(d, 9, 0), "B", "456", &existing);
        assert!(matches!(again, Err(BookingError::Collision(slot)) if slot == at(d, 9, 0)));
    }

    #[test]
    fn third_reservation_hits_capacity() {
        let d = even_thursday();
        let mut existing = Vec::new();
        for slot in candidate_slots(ClinicDay::Thursday, d) {
            let apt = reserve(ClinicDay::Thursday, d, slot, "P", "1", &existing).unwrap();
            existing.push(apt);
        }

        for slot in candidate_slots(ClinicDay::Thursday, d) {
            let result = reserve(ClinicDay::Thursday, d, slot, "Q", "2", &existing);
            assert!(matches!(result, Err(BookingError::Capacity(full)) if full == d));
        }
    }

    #[test]
    fn reserve_rejects_blank_fields() {
        let d = tuesday();
        for (name, contact) in [("", "123"), ("A", "   "), ("", "")] {
            let result = reserve(ClinicDay::Tuesday, d, at(d, 9, 0), name, contact, &[]);
            assert!(matches!(result, Err(BookingError::Validation(_))));
        }
    }

    #[test]
    fn reserve_rejects_off_schedule_time() {
        let d = odd_thursday();
        let result = reserve(ClinicDay::Thursday, d, at(d, 11, 0), "A", "1", &[]);
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn remove_frees_the_slot() {
        let d = tuesday();
        let mut existing = vec![
            booking(ClinicDay::Tuesday, at(d, 9, 0), "A"),
            booking(ClinicDay::Tuesday, at(d, 9, 30), "B"),
        ];

        let target = remove(ClinicDay::Tuesday, d, at(d, 9, 30), &existing).unwrap();
        assert_eq!(target.patient_name, "B");
        existing.retain(|apt| *apt != target);

        assert_eq!(available_slots(ClinicDay::Tuesday, d, &existing), vec![at(d, 9, 30)]);
    }

    #[test]
    fn remove_missing_booking_is_not_found() {
        let d = tuesday();
        let existing = vec![booking(ClinicDay::Tuesday, at(d, 9, 0), "A")];
        let result = remove(ClinicDay::Tuesday, d, at(d, 9, 30), &existing);
        assert!(matches!(result, Err(BookingError::NotFound { .. })));
    }

    #[test]
    fn booked_slots_are_sorted() {
        let d = tuesday();
        let existing = vec![
            booking(ClinicDay::Tuesday, at(d, 9, 30), "B"),
            booking(ClinicDay::Tuesday, at(d, 9, 0), "A"),
        ];
        assert_eq!(
            booked_slots(ClinicDay::Tuesday, d, &existing),
            vec![at(d, 9, 0), at(d, 9, 30)]
        );
    }
}
