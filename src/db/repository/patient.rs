use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Patient;

use super::decode_uuid;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, phone, gender, age, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.phone,
            patient.gender,
            patient.age,
            patient.status,
        ],
    )?;
    Ok(())
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET name = ?2, phone = ?3, gender = ?4, age = ?5, status = ?6
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.phone,
            patient.gender,
            patient.age,
            patient.status,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient.id.to_string(),
        });
    }
    Ok(())
}

pub fn find_patient_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    find_patient(conn, "id = ?1", &id.to_string())
}

pub fn find_patient_by_name(conn: &Connection, name: &str) -> Result<Option<Patient>, DatabaseError> {
    find_patient(conn, "name = ?1", name)
}

pub fn find_patient_by_phone(conn: &Connection, phone: &str) -> Result<Option<Patient>, DatabaseError> {
    find_patient(conn, "phone = ?1", phone)
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, gender, age, status FROM patients ORDER BY name",
    )?;
    let rows = stmt.query_map([], map_patient_row)?;
    collect_patients(rows)
}

/// Distinct patients drawn from a doctor's appointments.
pub fn find_patients_by_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT p.id, p.name, p.phone, p.gender, p.age, p.status
         FROM patients p
         JOIN appointments a ON a.patient_id = p.id
         WHERE a.doctor_id = ?1
         ORDER BY p.name",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], map_patient_row)?;
    collect_patients(rows)
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM patients WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn find_patient(
    conn: &Connection,
    predicate: &str,
    value: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!(
        "SELECT id, name, phone, gender, age, status FROM patients WHERE {predicate} LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let result = stmt.query_row(params![value], map_patient_row);
    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    name: String,
    phone: String,
    gender: String,
    age: u32,
    status: String,
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        gender: row.get(3)?,
        age: row.get(4)?,
        status: row.get(5)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: decode_uuid(&row.id)?,
        name: row.name,
        phone: row.phone,
        gender: row.gender,
        age: row.age,
        status: row.status,
    })
}

fn collect_patients(
    rows: impl Iterator<Item = rusqlite::Result<PatientRow>>,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}
