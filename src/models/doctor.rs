use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Weekday;

/// A doctor with a working calendar: attend/leave times bound the hours
/// bookable on each of the working days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub attend_time: NaiveTime,
    pub leave_time: NaiveTime,
    pub working_days: Vec<Weekday>,
}
