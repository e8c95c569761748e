use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Appointment;

use super::{decode_datetime, decode_uuid, encode_datetime};

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, doctor_id, patient_id, appointment_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            appointment.id.to_string(),
            appointment.doctor_id.to_string(),
            appointment.patient_id.to_string(),
            encode_datetime(appointment.appointment_date),
        ],
    )?;
    Ok(())
}

pub fn update_appointment(conn: &Connection, appointment: &Appointment) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET doctor_id = ?2, patient_id = ?3, appointment_date = ?4
         WHERE id = ?1",
        params![
            appointment.id.to_string(),
            appointment.doctor_id.to_string(),
            appointment.patient_id.to_string(),
            encode_datetime(appointment.appointment_date),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appointment.id.to_string(),
        });
    }
    Ok(())
}

pub fn find_appointment_by_id(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_date
         FROM appointments WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], map_appointment_row);
    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A doctor's appointments whose date falls inside [start, end], ordered
/// by date. Bounds are inclusive; the stored format compares
/// lexicographically in chronological order.
pub fn find_appointments_by_doctor_and_date_range(
    conn: &Connection,
    doctor_id: &Uuid,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_date
         FROM appointments
         WHERE doctor_id = ?1 AND appointment_date >= ?2 AND appointment_date <= ?3
         ORDER BY appointment_date",
    )?;
    let rows = stmt.query_map(
        params![
            doctor_id.to_string(),
            encode_datetime(start),
            encode_datetime(end)
        ],
        map_appointment_row,
    )?;
    collect_appointments(rows)
}

pub fn find_appointments_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_date
         FROM appointments WHERE doctor_id = ?1 ORDER BY appointment_date",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_appointment_row)?;
    collect_appointments(rows)
}

pub fn find_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_date
         FROM appointments WHERE patient_id = ?1 ORDER BY appointment_date",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_appointment_row)?;
    collect_appointments(rows)
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    doctor_id: String,
    patient_id: String,
    appointment_date: String,
}

fn map_appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        appointment_date: row.get(3)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: decode_uuid(&row.id)?,
        doctor_id: decode_uuid(&row.doctor_id)?,
        patient_id: decode_uuid(&row.patient_id)?,
        appointment_date: decode_datetime(&row.appointment_date)?,
    })
}

fn collect_appointments(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}
