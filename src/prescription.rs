//! Prescription service and linkage guard.
//!
//! A prescription references exactly one doctor, patient, and
//! appointment. The guard enforces two rules before anything persists:
//! an appointment carries at most one prescription
//! (lookup-before-insert), and the issue date never falls on a calendar
//! day before the appointment's day.

use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::repository as repo;
use crate::error::ClinicError;
use crate::models::Prescription;

/// Prescription request as received from the presentation layer.
/// `date_issued` defaults to the current time when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub prescription_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub date_issued: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

/// Issue a prescription against an appointment.
pub fn add_prescription(
    conn: &mut Connection,
    request: &PrescriptionRequest,
) -> Result<Prescription, ClinicError> {
    if request.prescription_id.is_some() {
        return Err(ClinicError::invalid(
            "prescription_id",
            "must not be supplied on create",
        ));
    }
    let doctor_id = request
        .doctor_id
        .ok_or_else(|| ClinicError::invalid("doctor_id", "required"))?;
    let patient_id = request
        .patient_id
        .ok_or_else(|| ClinicError::invalid("patient_id", "required"))?;
    let appointment_id = request
        .appointment_id
        .ok_or_else(|| ClinicError::invalid("appointment_id", "required"))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let doctor = repo::find_doctor_by_id(&tx, &doctor_id)?
        .ok_or_else(|| ClinicError::not_found("doctor", doctor_id))?;
    let patient = repo::find_patient_by_id(&tx, &patient_id)?
        .ok_or_else(|| ClinicError::not_found("patient", patient_id))?;
    let appointment = repo::find_appointment_by_id(&tx, &appointment_id)?
        .ok_or_else(|| ClinicError::not_found("appointment", appointment_id))?;

    if let Some(existing) = repo::find_prescription_by_appointment(&tx, &appointment_id)? {
        return Err(ClinicError::DuplicateLinkage {
            appointment_id,
            existing_prescription_id: existing.id,
        });
    }

    let date_issued = request
        .date_issued
        .unwrap_or_else(|| Local::now().naive_local());
    check_issue_date(date_issued, appointment.appointment_date)?;

    let prescription = Prescription {
        id: Uuid::new_v4(),
        doctor_id: doctor.id,
        patient_id: patient.id,
        appointment_id,
        date_issued,
        notes: request.notes.clone(),
    };
    repo::insert_prescription(&tx, &prescription)?;
    tx.commit()?;

    info!(
        prescription = %prescription.id,
        appointment = %appointment_id,
        "prescription issued"
    );
    Ok(prescription)
}

/// Update an existing prescription. Re-resolves doctor/patient; moving
/// the prescription to a different appointment re-runs the linkage
/// guard against the new appointment.
pub fn update_prescription(
    conn: &mut Connection,
    request: &PrescriptionRequest,
) -> Result<Prescription, ClinicError> {
    let id = request
        .prescription_id
        .ok_or_else(|| ClinicError::invalid("prescription_id", "required"))?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut prescription = repo::find_prescription_by_id(&tx, &id)?
        .ok_or_else(|| ClinicError::not_found("prescription", id))?;

    let doctor_id = request.doctor_id.unwrap_or(prescription.doctor_id);
    repo::find_doctor_by_id(&tx, &doctor_id)?
        .ok_or_else(|| ClinicError::not_found("doctor", doctor_id))?;
    let patient_id = request.patient_id.unwrap_or(prescription.patient_id);
    repo::find_patient_by_id(&tx, &patient_id)?
        .ok_or_else(|| ClinicError::not_found("patient", patient_id))?;

    let date_issued = request.date_issued.unwrap_or(prescription.date_issued);

    if let Some(new_appointment_id) = request.appointment_id {
        if new_appointment_id != prescription.appointment_id {
            let appointment = repo::find_appointment_by_id(&tx, &new_appointment_id)?
                .ok_or_else(|| ClinicError::not_found("appointment", new_appointment_id))?;
            if let Some(other) = repo::find_prescription_by_appointment(&tx, &new_appointment_id)? {
                return Err(ClinicError::DuplicateLinkage {
                    appointment_id: new_appointment_id,
                    existing_prescription_id: other.id,
                });
            }
            check_issue_date(date_issued, appointment.appointment_date)?;
            prescription.appointment_id = new_appointment_id;
        }
    }

    prescription.doctor_id = doctor_id;
    prescription.patient_id = patient_id;
    prescription.date_issued = date_issued;
    if request.notes.is_some() {
        prescription.notes = request.notes.clone();
    }
    repo::update_prescription(&tx, &prescription)?;
    tx.commit()?;

    info!(prescription = %id, "prescription updated");
    Ok(prescription)
}

/// Delete a prescription by identity; rejected if absent.
pub fn delete_prescription(conn: &mut Connection, id: Uuid) -> Result<(), ClinicError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_prescription_by_id(&tx, &id)?
        .ok_or_else(|| ClinicError::not_found("prescription", id))?;
    repo::delete_prescription(&tx, &id)?;
    tx.commit()?;

    info!(prescription = %id, "prescription deleted");
    Ok(())
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Prescription, ClinicError> {
    repo::find_prescription_by_id(conn, id)?
        .ok_or_else(|| ClinicError::not_found("prescription", id))
}

pub fn get_prescriptions_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Prescription>, ClinicError> {
    Ok(repo::find_prescriptions_by_doctor(conn, doctor_id)?)
}

pub fn get_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, ClinicError> {
    Ok(repo::find_prescriptions_by_patient(conn, patient_id)?)
}

/// The issue date may match the appointment's day or any later day,
/// never an earlier one. Compared at day precision.
fn check_issue_date(
    date_issued: NaiveDateTime,
    appointment_date: NaiveDateTime,
) -> Result<(), ClinicError> {
    if date_issued.date() < appointment_date.date() {
        return Err(ClinicError::TemporalOrderingViolation {
            date_issued,
            appointment_date,
        });
    }
    Ok(())
}
