//! Doctor/patient directory: registration, update, and natural-key
//! lookup. Registration owns the entity-level invariants (phone format,
//! working hours inside the clinic window, name uniqueness); the
//! scheduling engine can then assume resolved doctors are well-formed.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::repository as repo;
use crate::error::ClinicError;
use crate::models::{Doctor, Patient, Weekday};
use crate::scheduling::{clinic_close, clinic_open};

/// Accepted phone numbers: a local mobile prefix followed by 8 digits.
const PHONE_PATTERN: &str = "^(010|011|012|015)[0-9]{8}$";

fn phone_is_valid(phone: &str) -> bool {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_RE
        .get_or_init(|| Regex::new(PHONE_PATTERN).unwrap())
        .is_match(phone)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorRegistration {
    pub doctor_id: Option<Uuid>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub attend_time: Option<NaiveTime>,
    pub leave_time: Option<NaiveTime>,
    pub working_days: Vec<Weekday>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRegistration {
    pub patient_id: Option<Uuid>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub status: Option<String>,
}

// ───────────────────────────────────────────
// Doctors
// ───────────────────────────────────────────

pub fn register_doctor(
    conn: &mut Connection,
    registration: &DoctorRegistration,
) -> Result<Doctor, ClinicError> {
    if registration.doctor_id.is_some() {
        return Err(ClinicError::invalid(
            "doctor_id",
            "must not be supplied on registration",
        ));
    }
    let (name, phone, attend_time, leave_time) = validate_doctor_fields(registration)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if repo::find_doctor_by_name(&tx, name)?.is_some() {
        return Err(ClinicError::already_exists("doctor", name));
    }
    if repo::find_doctor_by_phone(&tx, phone)?.is_some() {
        return Err(ClinicError::already_exists("doctor", phone));
    }

    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: name.into(),
        phone: phone.into(),
        attend_time,
        leave_time,
        working_days: registration.working_days.clone(),
    };
    repo::insert_doctor(&tx, &doctor)?;
    tx.commit()?;

    info!(doctor = %doctor.name, "doctor registered");
    Ok(doctor)
}

pub fn update_doctor(
    conn: &mut Connection,
    registration: &DoctorRegistration,
) -> Result<Doctor, ClinicError> {
    let id = registration
        .doctor_id
        .ok_or_else(|| ClinicError::invalid("doctor_id", "required"))?;
    let (name, phone, attend_time, leave_time) = validate_doctor_fields(registration)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_doctor_by_id(&tx, &id)?.ok_or_else(|| ClinicError::not_found("doctor", id))?;
    if let Some(other) = repo::find_doctor_by_name(&tx, name)? {
        if other.id != id {
            return Err(ClinicError::already_exists("doctor", name));
        }
    }
    if let Some(other) = repo::find_doctor_by_phone(&tx, phone)? {
        if other.id != id {
            return Err(ClinicError::already_exists("doctor", phone));
        }
    }

    let doctor = Doctor {
        id,
        name: name.into(),
        phone: phone.into(),
        attend_time,
        leave_time,
        working_days: registration.working_days.clone(),
    };
    repo::update_doctor(&tx, &doctor)?;
    tx.commit()?;

    info!(doctor = %doctor.name, "doctor updated");
    Ok(doctor)
}

/// Delete a doctor; refused while appointments or prescriptions still
/// reference them.
pub fn delete_doctor(conn: &mut Connection, id: Uuid) -> Result<(), ClinicError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_doctor_by_id(&tx, &id)?.ok_or_else(|| ClinicError::not_found("doctor", id))?;
    if !repo::find_appointments_by_doctor(&tx, &id)?.is_empty() {
        return Err(ClinicError::invalid("doctor_id", "doctor has booked appointments"));
    }
    if !repo::find_prescriptions_by_doctor(&tx, &id)?.is_empty() {
        return Err(ClinicError::invalid("doctor_id", "doctor has issued prescriptions"));
    }

    repo::delete_doctor(&tx, &id)?;
    tx.commit()?;

    info!(doctor = %id, "doctor deleted");
    Ok(())
}

pub fn get_doctor_by_name(conn: &Connection, name: &str) -> Result<Doctor, ClinicError> {
    repo::find_doctor_by_name(conn, name)?.ok_or_else(|| ClinicError::not_found("doctor", name))
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, ClinicError> {
    Ok(repo::list_doctors(conn)?)
}

fn validate_doctor_fields<'a>(
    registration: &'a DoctorRegistration,
) -> Result<(&'a str, &'a str, NaiveTime, NaiveTime), ClinicError> {
    let name = registration
        .name
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("name", "required"))?;
    let phone = registration
        .phone
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("phone", "required"))?;
    let attend_time = registration
        .attend_time
        .ok_or_else(|| ClinicError::invalid("attend_time", "required"))?;
    let leave_time = registration
        .leave_time
        .ok_or_else(|| ClinicError::invalid("leave_time", "required"))?;

    if !phone_is_valid(phone) {
        return Err(ClinicError::invalid("phone", "must match a local mobile number"));
    }
    if leave_time <= attend_time {
        return Err(ClinicError::invalid("leave_time", "must be after attend_time"));
    }
    if attend_time <= clinic_open() {
        return Err(ClinicError::invalid(
            "attend_time",
            "must be after the clinic opens at 07:00",
        ));
    }
    if leave_time >= clinic_close() {
        return Err(ClinicError::invalid(
            "leave_time",
            "must be before the clinic closes at 23:59",
        ));
    }
    if registration.working_days.is_empty() {
        return Err(ClinicError::invalid("working_days", "at least one day required"));
    }

    Ok((name, phone, attend_time, leave_time))
}

// ───────────────────────────────────────────
// Patients
// ───────────────────────────────────────────

pub fn register_patient(
    conn: &mut Connection,
    registration: &PatientRegistration,
) -> Result<Patient, ClinicError> {
    if registration.patient_id.is_some() {
        return Err(ClinicError::invalid(
            "patient_id",
            "must not be supplied on registration",
        ));
    }
    let (name, phone, gender, age, status) = validate_patient_fields(registration)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Names are not unique at the schema level; the registration path
    // enforces it so the natural key stays unambiguous.
    if repo::find_patient_by_name(&tx, name)?.is_some() {
        return Err(ClinicError::already_exists("patient", name));
    }
    if repo::find_patient_by_phone(&tx, phone)?.is_some() {
        return Err(ClinicError::already_exists("patient", phone));
    }

    let patient = Patient {
        id: Uuid::new_v4(),
        name: name.into(),
        phone: phone.into(),
        gender: gender.into(),
        age,
        status: status.into(),
    };
    repo::insert_patient(&tx, &patient)?;
    tx.commit()?;

    info!(patient = %patient.name, "patient registered");
    Ok(patient)
}

pub fn update_patient(
    conn: &mut Connection,
    registration: &PatientRegistration,
) -> Result<Patient, ClinicError> {
    let id = registration
        .patient_id
        .ok_or_else(|| ClinicError::invalid("patient_id", "required"))?;
    let (name, phone, gender, age, status) = validate_patient_fields(registration)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_patient_by_id(&tx, &id)?.ok_or_else(|| ClinicError::not_found("patient", id))?;
    if let Some(other) = repo::find_patient_by_name(&tx, name)? {
        if other.id != id {
            return Err(ClinicError::already_exists("patient", name));
        }
    }

    let patient = Patient {
        id,
        name: name.into(),
        phone: phone.into(),
        gender: gender.into(),
        age,
        status: status.into(),
    };
    repo::update_patient(&tx, &patient)?;
    tx.commit()?;

    info!(patient = %patient.name, "patient updated");
    Ok(patient)
}

/// Delete a patient; refused while appointments or prescriptions still
/// reference them.
pub fn delete_patient(conn: &mut Connection, id: Uuid) -> Result<(), ClinicError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    repo::find_patient_by_id(&tx, &id)?.ok_or_else(|| ClinicError::not_found("patient", id))?;
    if !repo::find_appointments_by_patient(&tx, &id)?.is_empty() {
        return Err(ClinicError::invalid("patient_id", "patient has booked appointments"));
    }
    if !repo::find_prescriptions_by_patient(&tx, &id)?.is_empty() {
        return Err(ClinicError::invalid("patient_id", "patient has prescriptions"));
    }

    repo::delete_patient(&tx, &id)?;
    tx.commit()?;

    info!(patient = %id, "patient deleted");
    Ok(())
}

pub fn get_patient_by_name(conn: &Connection, name: &str) -> Result<Patient, ClinicError> {
    repo::find_patient_by_name(conn, name)?.ok_or_else(|| ClinicError::not_found("patient", name))
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, ClinicError> {
    Ok(repo::list_patients(conn)?)
}

/// Distinct patients seen across a doctor's appointments.
pub fn get_patients_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Patient>, ClinicError> {
    Ok(repo::find_patients_by_doctor(conn, doctor_id)?)
}

fn validate_patient_fields<'a>(
    registration: &'a PatientRegistration,
) -> Result<(&'a str, &'a str, &'a str, u32, &'a str), ClinicError> {
    let name = registration
        .name
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("name", "required"))?;
    let phone = registration
        .phone
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("phone", "required"))?;
    let gender = registration
        .gender
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("gender", "required"))?;
    let age = registration
        .age
        .ok_or_else(|| ClinicError::invalid("age", "required"))?;
    let status = registration
        .status
        .as_deref()
        .ok_or_else(|| ClinicError::invalid("status", "required"))?;

    if age < 12 {
        return Err(ClinicError::invalid("age", "must be at least 12"));
    }
    if !phone_is_valid(phone) {
        return Err(ClinicError::invalid("phone", "must match a local mobile number"));
    }
    if status.trim().is_empty() {
        return Err(ClinicError::invalid("status", "must not be empty"));
    }

    Ok((name, phone, gender, age, status))
}
