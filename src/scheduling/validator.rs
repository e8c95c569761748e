//! Booking validation: calendar rules first, then conflict detection,
//! short-circuiting on the first rejection.
//!
//! Pure over the provided snapshot; callers own atomicity (see
//! [`super::service`]).

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::error::ClinicError;
use crate::models::{Appointment, Doctor};

use super::{calendar, conflict};

/// Validate a new booking against the doctor's calendar and the same-day
/// snapshot.
pub fn validate_create(
    doctor: &Doctor,
    candidate: NaiveDateTime,
    existing: &[Appointment],
    today: NaiveDate,
) -> Result<(), ClinicError> {
    calendar::check_booking_window(doctor, candidate, today)?;
    conflict::find_conflict(existing, candidate, None)?;
    Ok(())
}

/// Validate moving an existing booking; the appointment under
/// modification is excluded so it never conflicts with itself.
pub fn validate_update(
    doctor: &Doctor,
    candidate: NaiveDateTime,
    existing: &[Appointment],
    appointment_id: Uuid,
    today: NaiveDate,
) -> Result<(), ClinicError> {
    calendar::check_booking_window(doctor, candidate, today)?;
    conflict::find_conflict(existing, candidate, Some(appointment_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap() // a Monday
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn doctor() -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Ahmed".into(),
            phone: "01012345678".into(),
            attend_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            leave_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            working_days: vec![Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday],
        }
    }

    fn booked(doctor: &Doctor, day: u32, hour: u32, minute: u32) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: Uuid::new_v4(),
            appointment_date: at(day, hour, minute),
        }
    }

    #[test]
    fn clean_slot_passes() {
        let doctor = doctor();
        let result = validate_create(&doctor, at(3, 10, 0), &[], today());
        assert!(result.is_ok());
    }

    #[test]
    fn calendar_violation_reported_before_conflicts() {
        // Saturday booking collides exactly with an existing one; the
        // working-day rejection must win.
        let doctor = doctor();
        let existing = booked(&doctor, 7, 10, 0);
        let result = validate_create(&doctor, at(7, 10, 0), &[existing], today());
        assert!(matches!(result, Err(ClinicError::OutsideWorkingWindow(_))));
    }

    #[test]
    fn conflict_reported_when_calendar_passes() {
        let doctor = doctor();
        let existing = booked(&doctor, 3, 10, 0);
        let result = validate_create(&doctor, at(3, 10, 15), &[existing], today());
        assert!(matches!(result, Err(ClinicError::SchedulingConflict(_))));
    }

    #[test]
    fn update_to_own_time_is_not_a_self_conflict() {
        let doctor = doctor();
        let existing = booked(&doctor, 3, 10, 0);
        let result = validate_update(
            &doctor,
            existing.appointment_date,
            std::slice::from_ref(&existing),
            existing.id,
            today(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn update_still_conflicts_with_other_bookings() {
        let doctor = doctor();
        let moving = booked(&doctor, 3, 10, 0);
        let other = booked(&doctor, 3, 11, 0);
        let result = validate_update(
            &doctor,
            at(3, 11, 15),
            &[moving.clone(), other],
            moving.id,
            today(),
        );
        assert!(matches!(result, Err(ClinicError::SchedulingConflict(_))));
    }

    #[test]
    fn verdict_is_idempotent() {
        let doctor = doctor();
        let existing = booked(&doctor, 3, 10, 0);
        let first = validate_create(&doctor, at(3, 10, 15), std::slice::from_ref(&existing), today());
        let second = validate_create(&doctor, at(3, 10, 15), std::slice::from_ref(&existing), today());
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }
}
