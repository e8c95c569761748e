use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A prescription issued against exactly one appointment. `date_issued`
/// may never fall on a day before the appointment's day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
    pub date_issued: NaiveDateTime,
    pub notes: Option<String>,
}
