//! Repository layer: entity-scoped database operations.
//!
//! Free functions over a borrowed connection; callers that need
//! read-validate-write atomicity pass a transaction (it derefs to
//! `Connection`).

mod appointment;
mod doctor;
mod patient;
mod prescription;

pub use appointment::*;
pub use doctor::*;
pub use patient::*;
pub use prescription::*;

use chrono::{NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::DatabaseError;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const TIME_FORMAT: &str = "%H:%M";

pub(crate) fn encode_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn decode_datetime(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid datetime {raw:?}: {e}")))
}

pub(crate) fn encode_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

pub(crate) fn decode_time(raw: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid time {raw:?}: {e}")))
}

pub(crate) fn decode_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid uuid {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn datetime_encoding_round_trips() {
        let dt = NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(encode_datetime(dt), "2025-06-03 10:30:00");
        assert_eq!(decode_datetime("2025-06-03 10:30:00").unwrap(), dt);
    }

    #[test]
    fn time_encoding_round_trips() {
        let t = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(encode_time(t), "09:00");
        assert_eq!(decode_time("09:00").unwrap(), t);
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(decode_datetime("yesterday").is_err());
        assert!(decode_time("25:99").is_err());
        assert!(decode_uuid("not-a-uuid").is_err());
    }
}
