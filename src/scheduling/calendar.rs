//! Calendar rules: is a candidate timestamp inside a doctor's working
//! calendar and the clinic's operating window?
//!
//! Pure. The checks run in a fixed order and the first failure wins, so
//! the same input always reports the same violation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::models::{Doctor, Weekday};

use super::{clinic_close, clinic_open};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarViolation {
    /// Bookings must land on a future day, never today or earlier.
    #[error("{date} is not after today ({today})")]
    DateNotInFuture { date: NaiveDate, today: NaiveDate },

    #[error("doctor is off on {weekday}")]
    DoctorNotWorking { weekday: Weekday },

    #[error("{time} is before the doctor's attend time {attend_time}")]
    BeforeAttendTime {
        time: NaiveTime,
        attend_time: NaiveTime,
    },

    #[error("{time} is after the doctor's leave time {leave_time}")]
    AfterLeaveTime {
        time: NaiveTime,
        leave_time: NaiveTime,
    },

    #[error("{time} is outside clinic hours (07:00 to 23:59)")]
    OutsideClinicHours { time: NaiveTime },
}

/// Check a candidate booking timestamp against the doctor's calendar.
pub fn check_booking_window(
    doctor: &Doctor,
    when: NaiveDateTime,
    today: NaiveDate,
) -> Result<(), CalendarViolation> {
    let date = when.date();
    let time = when.time();

    if date <= today {
        return Err(CalendarViolation::DateNotInFuture { date, today });
    }

    let weekday = Weekday::from_chrono(date.weekday());
    if !doctor.working_days.contains(&weekday) {
        return Err(CalendarViolation::DoctorNotWorking { weekday });
    }

    if time < doctor.attend_time {
        return Err(CalendarViolation::BeforeAttendTime {
            time,
            attend_time: doctor.attend_time,
        });
    }
    if time > doctor.leave_time {
        return Err(CalendarViolation::AfterLeaveTime {
            time,
            leave_time: doctor.leave_time,
        });
    }

    if time < clinic_open() || time > clinic_close() {
        return Err(CalendarViolation::OutsideClinicHours { time });
    }

    Ok(())
}
