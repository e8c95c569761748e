//! Scheduling service: the entry point the presentation layer consumes.
//!
//! Each operation resolves its references, validates against a snapshot
//! of the doctor's same-day bookings, and commits, all inside one
//! immediate (write-locking) transaction. SQLite has no row-level locks,
//! so the lock is database-wide; that subsumes the required
//! (doctor, calendar-day) critical section, and two concurrent booking
//! attempts serialise instead of both validating against a stale
//! snapshot. A rejection rolls the transaction back with no partial
//! writes.

use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::repository as repo;
use crate::error::ClinicError;
use crate::models::Appointment;

use super::{conflict, validator};

/// Booking request as received from the presentation layer. Doctor and
/// patient arrive as natural keys (names); identities are resolved here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub appointment_id: Option<Uuid>,
    pub appointment_date: Option<NaiveDateTime>,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
}

/// Book a new appointment.
pub fn create_appointment(
    conn: &mut Connection,
    request: &AppointmentRequest,
) -> Result<Appointment, ClinicError> {
    if request.appointment_id.is_some() {
        return Err(ClinicError::invalid(
            "appointment_id",
            "must not be supplied on create",
        ));
    }
    let when = request
        .appointment_date
        .ok_or_else(|| ClinicError::invalid("appointment_date", "required"))?;
    let doctor_name = request
        .doctor_name
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("doctor_name", "required"))?;
    let patient_name = request
        .patient_name
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("patient_name", "required"))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let doctor = repo::find_doctor_by_name(&tx, doctor_name)?
        .ok_or_else(|| ClinicError::not_found("doctor", doctor_name))?;
    let patient = repo::find_patient_by_name(&tx, patient_name)?
        .ok_or_else(|| ClinicError::not_found("patient", patient_name))?;

    let (day_start, day_end) = conflict::day_window(when.date());
    let same_day =
        repo::find_appointments_by_doctor_and_date_range(&tx, &doctor.id, day_start, day_end)?;
    debug!(
        doctor = %doctor.name,
        existing = same_day.len(),
        "validating booking for {when}"
    );

    validator::validate_create(&doctor, when, &same_day, Local::now().date_naive())?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: patient.id,
        appointment_date: when,
    };
    repo::insert_appointment(&tx, &appointment)?;
    tx.commit()?;

    info!(
        appointment = %appointment.id,
        doctor = %doctor.name,
        patient = %patient.name,
        "appointment booked for {when}"
    );
    Ok(appointment)
}

/// Move an existing appointment to a new date, doctor, or patient.
pub fn update_appointment(
    conn: &mut Connection,
    request: &AppointmentRequest,
) -> Result<Appointment, ClinicError> {
    let id = request
        .appointment_id
        .ok_or_else(|| ClinicError::invalid("appointment_id", "required"))?;
    let when = request
        .appointment_date
        .ok_or_else(|| ClinicError::invalid("appointment_date", "required"))?;
    let doctor_name = request
        .doctor_name
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("doctor_name", "required"))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut appointment = repo::find_appointment_by_id(&tx, &id)?
        .ok_or_else(|| ClinicError::not_found("appointment", id))?;
    let doctor = repo::find_doctor_by_name(&tx, doctor_name)?
        .ok_or_else(|| ClinicError::not_found("doctor", doctor_name))?;
    let patient_id = match request.patient_name.as_deref() {
        Some(name) => {
            repo::find_patient_by_name(&tx, name)?
                .ok_or_else(|| ClinicError::not_found("patient", name))?
                .id
        }
        None => appointment.patient_id,
    };

    let (day_start, day_end) = conflict::day_window(when.date());
    let same_day =
        repo::find_appointments_by_doctor_and_date_range(&tx, &doctor.id, day_start, day_end)?;

    validator::validate_update(&doctor, when, &same_day, id, Local::now().date_naive())?;

    appointment.doctor_id = doctor.id;
    appointment.patient_id = patient_id;
    appointment.appointment_date = when;
    repo::update_appointment(&tx, &appointment)?;
    tx.commit()?;

    info!(appointment = %id, doctor = %doctor.name, "appointment moved to {when}");
    Ok(appointment)
}

/// Delete an appointment by identity.
///
/// An appointment with a linked prescription cannot be deleted; the
/// prescription must go first. Dangling prescription references are
/// forbidden rather than cascaded.
pub fn delete_appointment(conn: &mut Connection, id: Uuid) -> Result<(), ClinicError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_appointment_by_id(&tx, &id)?
        .ok_or_else(|| ClinicError::not_found("appointment", id))?;

    if let Some(prescription) = repo::find_prescription_by_appointment(&tx, &id)? {
        return Err(ClinicError::invalid(
            "appointment_id",
            format!("prescription {} still references this appointment", prescription.id),
        ));
    }

    repo::delete_appointment(&tx, &id)?;
    tx.commit()?;

    info!(appointment = %id, "appointment deleted");
    Ok(())
}

pub fn get_appointments_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Appointment>, ClinicError> {
    Ok(repo::find_appointments_by_doctor(conn, doctor_id)?)
}

pub fn get_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, ClinicError> {
    Ok(repo::find_appointments_by_patient(conn, patient_id)?)
}
