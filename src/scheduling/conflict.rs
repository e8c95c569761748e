//! Conflict detection: does a candidate timestamp collide with one of the
//! doctor's existing bookings on the same calendar day?
//!
//! Pure. The caller supplies the same-day snapshot (see [`day_window`]);
//! appointments on different days are never compared, so two bookings one
//! minute apart across midnight do not conflict.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Appointment;

use super::MIN_SEPARATION_MINUTES;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingConflict {
    /// The doctor already has an appointment at exactly this timestamp.
    #[error("doctor already booked at this time (appointment {existing_id})")]
    ExactlyBooked { existing_id: Uuid },

    /// Within the minimum separation of an existing appointment, on
    /// either side of it.
    #[error("appointment {existing_id} is only {minutes_apart} minutes away")]
    TooClose {
        existing_id: Uuid,
        minutes_apart: i64,
    },
}

/// The inclusive [00:00:00, 23:59:59] window of a calendar day, used to
/// scope same-day conflict checks.
pub fn day_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (
        date.and_hms_opt(0, 0, 0).unwrap(),
        date.and_hms_opt(23, 59, 59).unwrap(),
    )
}

/// Scan the same-day snapshot for a collision with `candidate`.
///
/// `exclude` names the appointment being updated, so a booking never
/// conflicts with itself. Whole minutes are compared; the rule is
/// symmetric around the existing booking.
pub fn find_conflict(
    existing: &[Appointment],
    candidate: NaiveDateTime,
    exclude: Option<Uuid>,
) -> Result<(), BookingConflict> {
    for appointment in existing {
        if exclude == Some(appointment.id) {
            continue;
        }

        if appointment.appointment_date == candidate {
            return Err(BookingConflict::ExactlyBooked {
                existing_id: appointment.id,
            });
        }

        let minutes_apart = (appointment.appointment_date - candidate)
            .num_minutes()
            .abs();
        if minutes_apart < MIN_SEPARATION_MINUTES {
            return Err(BookingConflict::TooClose {
                existing_id: appointment.id,
                minutes_apart,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn booked(hour: u32, minute: u32) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            appointment_date: at(hour, minute),
        }
    }

    #[test]
    fn empty_day_is_conflict_free() {
        assert_eq!(find_conflict(&[], at(10, 0), None), Ok(()));
    }

    #[test]
    fn exact_time_is_a_double_booking() {
        let existing = booked(10, 0);
        let result = find_conflict(std::slice::from_ref(&existing), at(10, 0), None);
        assert_eq!(
            result,
            Err(BookingConflict::ExactlyBooked {
                existing_id: existing.id
            })
        );
    }

    #[test]
    fn fifteen_minutes_is_too_close() {
        let existing = booked(10, 0);
        let result = find_conflict(std::slice::from_ref(&existing), at(10, 15), None);
        assert_eq!(
            result,
            Err(BookingConflict::TooClose {
                existing_id: existing.id,
                minutes_apart: 15
            })
        );
    }

    #[test]
    fn too_close_applies_on_both_sides() {
        let existing = booked(10, 0);
        let result = find_conflict(std::slice::from_ref(&existing), at(9, 45), None);
        assert_eq!(
            result,
            Err(BookingConflict::TooClose {
                existing_id: existing.id,
                minutes_apart: 15
            })
        );
    }

    #[test]
    fn exactly_thirty_minutes_is_allowed() {
        let existing = booked(10, 0);
        assert_eq!(find_conflict(std::slice::from_ref(&existing), at(10, 30), None), Ok(()));
        assert_eq!(find_conflict(std::slice::from_ref(&existing), at(9, 30), None), Ok(()));
    }

    #[test]
    fn forty_five_minutes_is_allowed() {
        let existing = booked(10, 0);
        assert_eq!(find_conflict(std::slice::from_ref(&existing), at(10, 45), None), Ok(()));
    }

    #[test]
    fn twenty_nine_minutes_is_rejected() {
        let existing = booked(10, 0);
        let result = find_conflict(std::slice::from_ref(&existing), at(10, 29), None);
        assert!(matches!(result, Err(BookingConflict::TooClose { minutes_apart: 29, .. })));
    }

    #[test]
    fn excluded_appointment_never_conflicts_with_itself() {
        let existing = booked(10, 0);
        let result = find_conflict(std::slice::from_ref(&existing), at(10, 0), Some(existing.id));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn exclusion_leaves_other_bookings_in_force() {
        let updated = booked(10, 0);
        let other = booked(11, 0);
        let result = find_conflict(&[updated.clone(), other.clone()], at(11, 10), Some(updated.id));
        assert_eq!(
            result,
            Err(BookingConflict::TooClose {
                existing_id: other.id,
                minutes_apart: 10
            })
        );
    }

    #[test]
    fn first_colliding_booking_wins() {
        let first = booked(10, 0);
        let second = booked(10, 10);
        let result = find_conflict(&[first.clone(), second], at(10, 5), None);
        assert_eq!(
            result,
            Err(BookingConflict::TooClose {
                existing_id: first.id,
                minutes_apart: 5
            })
        );
    }

    #[test]
    fn late_evening_pair_inside_same_day_still_conflicts() {
        let existing = booked(23, 30);
        let result = find_conflict(std::slice::from_ref(&existing), at(23, 59), None);
        assert!(matches!(result, Err(BookingConflict::TooClose { minutes_apart: 29, .. })));
    }

    #[test]
    fn day_window_bounds() {
        let (start, end) = day_window(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(start, at(0, 0));
        assert_eq!(
            end,
            NaiveDate::from_ymd_opt(2025, 6, 3)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap()
        );
    }
}
