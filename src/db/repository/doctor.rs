use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Doctor, Weekday};

use super::{decode_time, decode_uuid, encode_time};

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, name, phone, attend_time, leave_time)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.phone,
            encode_time(doctor.attend_time),
            encode_time(doctor.leave_time),
        ],
    )?;
    for day in &doctor.working_days {
        conn.execute(
            "INSERT INTO doctor_working_days (doctor_id, weekday) VALUES (?1, ?2)",
            params![doctor.id.to_string(), day.as_str()],
        )?;
    }
    Ok(())
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE doctors SET name = ?2, phone = ?3, attend_time = ?4, leave_time = ?5
         WHERE id = ?1",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.phone,
            encode_time(doctor.attend_time),
            encode_time(doctor.leave_time),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: doctor.id.to_string(),
        });
    }
    conn.execute(
        "DELETE FROM doctor_working_days WHERE doctor_id = ?1",
        params![doctor.id.to_string()],
    )?;
    for day in &doctor.working_days {
        conn.execute(
            "INSERT INTO doctor_working_days (doctor_id, weekday) VALUES (?1, ?2)",
            params![doctor.id.to_string(), day.as_str()],
        )?;
    }
    Ok(())
}

pub fn find_doctor_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    find_doctor(conn, "id = ?1", &id.to_string())
}

pub fn find_doctor_by_name(conn: &Connection, name: &str) -> Result<Option<Doctor>, DatabaseError> {
    find_doctor(conn, "name = ?1", name)
}

pub fn find_doctor_by_phone(conn: &Connection, phone: &str) -> Result<Option<Doctor>, DatabaseError> {
    find_doctor(conn, "phone = ?1", phone)
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, attend_time, leave_time FROM doctors ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(DoctorRow {
            id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            attend_time: row.get(3)?,
            leave_time: row.get(4)?,
        })
    })?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(doctor_from_row(conn, row?)?);
    }
    Ok(doctors)
}

pub fn delete_doctor(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM doctors WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn find_doctor(
    conn: &Connection,
    predicate: &str,
    value: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!(
        "SELECT id, name, phone, attend_time, leave_time FROM doctors WHERE {predicate} LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let result = stmt.query_row(params![value], |row| {
        Ok(DoctorRow {
            id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            attend_time: row.get(3)?,
            leave_time: row.get(4)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(doctor_from_row(conn, row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Internal row type for Doctor mapping
struct DoctorRow {
    id: String,
    name: String,
    phone: String,
    attend_time: String,
    leave_time: String,
}

fn doctor_from_row(conn: &Connection, row: DoctorRow) -> Result<Doctor, DatabaseError> {
    let id = decode_uuid(&row.id)?;
    Ok(Doctor {
        id,
        name: row.name,
        phone: row.phone,
        attend_time: decode_time(&row.attend_time)?,
        leave_time: decode_time(&row.leave_time)?,
        working_days: load_working_days(conn, &id)?,
    })
}

fn load_working_days(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Weekday>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT weekday FROM doctor_working_days WHERE doctor_id = ?1",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string()], |row| {
        row.get::<_, String>(0)
    })?;

    let mut days = Vec::new();
    for row in rows {
        days.push(Weekday::from_str(&row?)?);
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::NaiveTime;

    fn make_doctor(name: &str, phone: &str) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: phone.into(),
            attend_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            leave_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            working_days: vec![Weekday::Monday, Weekday::Wednesday],
        }
    }

    #[test]
    fn insert_and_find_by_name_round_trips_working_days() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor("Dr. Ahmed", "01012345678");
        insert_doctor(&conn, &doctor).unwrap();

        let found = find_doctor_by_name(&conn, "Dr. Ahmed").unwrap().unwrap();
        assert_eq!(found.id, doctor.id);
        assert_eq!(found.attend_time, doctor.attend_time);
        assert_eq!(found.working_days.len(), 2);
        assert!(found.working_days.contains(&Weekday::Monday));
        assert!(found.working_days.contains(&Weekday::Wednesday));
    }

    #[test]
    fn find_unknown_name_returns_none() {
        let conn = open_memory_database().unwrap();
        assert!(find_doctor_by_name(&conn, "Dr. Nobody").unwrap().is_none());
    }

    #[test]
    fn find_by_phone() {
        let conn = open_memory_database().unwrap();
        insert_doctor(&conn, &make_doctor("Dr. Ahmed", "01012345678")).unwrap();
        assert!(find_doctor_by_phone(&conn, "01012345678").unwrap().is_some());
        assert!(find_doctor_by_phone(&conn, "01500000000").unwrap().is_none());
    }

    #[test]
    fn update_replaces_working_days() {
        let conn = open_memory_database().unwrap();
        let mut doctor = make_doctor("Dr. Ahmed", "01012345678");
        insert_doctor(&conn, &doctor).unwrap();

        doctor.working_days = vec![Weekday::Friday];
        doctor.leave_time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();
        update_doctor(&conn, &doctor).unwrap();

        let found = find_doctor_by_id(&conn, &doctor.id).unwrap().unwrap();
        assert_eq!(found.working_days, vec![Weekday::Friday]);
        assert_eq!(found.leave_time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn update_unknown_doctor_not_found() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor("Dr. Ghost", "01012345678");
        let result = update_doctor(&conn, &doctor);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn delete_unknown_doctor_not_found() {
        let conn = open_memory_database().unwrap();
        let result = delete_doctor(&conn, &Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn list_orders_by_name() {
        let conn = open_memory_database().unwrap();
        insert_doctor(&conn, &make_doctor("Dr. Zane", "01011111111")).unwrap();
        insert_doctor(&conn, &make_doctor("Dr. Amir", "01022222222")).unwrap();

        let doctors = list_doctors(&conn).unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].name, "Dr. Amir");
        assert_eq!(doctors[1].name, "Dr. Zane");
    }
}
