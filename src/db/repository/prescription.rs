use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Prescription;

use super::{decode_datetime, decode_uuid, encode_datetime};

pub fn insert_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, doctor_id, patient_id, appointment_id, date_issued, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            prescription.id.to_string(),
            prescription.doctor_id.to_string(),
            prescription.patient_id.to_string(),
            prescription.appointment_id.to_string(),
            encode_datetime(prescription.date_issued),
            prescription.notes,
        ],
    )?;
    Ok(())
}

pub fn update_prescription(
    conn: &Connection,
    prescription: &Prescription,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE prescriptions
         SET doctor_id = ?2, patient_id = ?3, appointment_id = ?4, date_issued = ?5, notes = ?6
         WHERE id = ?1",
        params![
            prescription.id.to_string(),
            prescription.doctor_id.to_string(),
            prescription.patient_id.to_string(),
            prescription.appointment_id.to_string(),
            encode_datetime(prescription.date_issued),
            prescription.notes,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: prescription.id.to_string(),
        });
    }
    Ok(())
}

pub fn find_prescription_by_id(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_id, date_issued, notes
         FROM prescriptions WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], map_prescription_row);
    match result {
        Ok(row) => Ok(Some(prescription_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Zero-or-one prescription linked to an appointment.
pub fn find_prescription_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_id, date_issued, notes
         FROM prescriptions WHERE appointment_id = ?1 LIMIT 1",
    )?;

    let result = stmt.query_row(params![appointment_id.to_string()], map_prescription_row);
    match result {
        Ok(row) => Ok(Some(prescription_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_prescriptions_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_id, date_issued, notes
         FROM prescriptions WHERE doctor_id = ?1 ORDER BY date_issued",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_prescription_row)?;
    collect_prescriptions(rows)
}

pub fn find_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_id, date_issued, notes
         FROM prescriptions WHERE patient_id = ?1 ORDER BY date_issued",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], map_prescription_row)?;
    collect_prescriptions(rows)
}

pub fn delete_prescription(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM prescriptions WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Prescription".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Prescription mapping
struct PrescriptionRow {
    id: String,
    doctor_id: String,
    patient_id: String,
    appointment_id: String,
    date_issued: String,
    notes: Option<String>,
}

fn map_prescription_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        appointment_id: row.get(3)?,
        date_issued: row.get(4)?,
        notes: row.get(5)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: decode_uuid(&row.id)?,
        doctor_id: decode_uuid(&row.doctor_id)?,
        patient_id: decode_uuid(&row.patient_id)?,
        appointment_id: decode_uuid(&row.appointment_id)?,
        date_issued: decode_datetime(&row.date_issued)?,
        notes: row.notes,
    })
}

fn collect_prescriptions(
    rows: impl Iterator<Item = rusqlite::Result<PrescriptionRow>>,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(prescription_from_row(row?)?);
    }
    Ok(prescriptions)
}
