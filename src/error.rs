//! Typed rejection taxonomy shared by the scheduling, prescription, and
//! directory services.
//!
//! Every rejection is terminal: validation is deterministic, so retrying
//! with the same input reproduces the same outcome. Variants carry the
//! structured context (which rule, which entity) the presentation layer
//! needs to render a message; localised text is not this crate's concern.

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::scheduling::calendar::CalendarViolation;
use crate::scheduling::conflict::BookingConflict;

#[derive(Debug, Error)]
pub enum ClinicError {
    /// Missing or forbidden request field.
    #[error("invalid request: {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    /// A doctor/patient/appointment/prescription reference did not resolve.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Failed the calendar rules (date ordering, working day, hours).
    #[error("outside working window: {0}")]
    OutsideWorkingWindow(#[from] CalendarViolation),

    /// Collides with an existing booking for the same doctor and day.
    #[error("scheduling conflict: {0}")]
    SchedulingConflict(#[from] BookingConflict),

    /// A second prescription for an appointment that already has one.
    #[error("appointment {appointment_id} already has prescription {existing_prescription_id}")]
    DuplicateLinkage {
        appointment_id: Uuid,
        existing_prescription_id: Uuid,
    },

    /// Prescription issue date falls before its appointment's date.
    #[error("prescription dated {date_issued} predates its appointment on {appointment_date}")]
    TemporalOrderingViolation {
        date_issued: NaiveDateTime,
        appointment_date: NaiveDateTime,
    },

    /// Registration would duplicate a unique natural key.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ClinicError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ClinicError {
    fn from(err: rusqlite::Error) -> Self {
        ClinicError::Database(DatabaseError::Sqlite(err))
    }
}
