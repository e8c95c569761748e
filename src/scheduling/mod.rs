//! Appointment booking engine.
//!
//! [`calendar`] and [`conflict`] are pure decision functions; [`validator`]
//! composes them; [`service`] runs the read-validate-write sequence inside
//! a write-locking transaction so concurrent bookings for the same doctor
//! and day serialise (see the atomicity notes on [`service`]).

pub mod calendar;
pub mod conflict;
pub mod service;
pub mod validator;

use chrono::NaiveTime;

/// Minimum buffer between two appointments for the same doctor on the
/// same calendar day.
pub const MIN_SEPARATION_MINUTES: i64 = 30;

/// Earliest bookable time of day; the clinic window is [07:00, 23:59]
/// inclusive.
pub fn clinic_open() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap()
}

/// Latest bookable time of day.
pub fn clinic_close() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap()
}
