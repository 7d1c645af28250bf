//! One expected-or-completed dose occurrence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single dose slot on the adherence calendar.
///
/// At most one record exists per `(medicine_id, date, reminder_time)`;
/// bulk generation replaces on that key. `taken_at` is set exactly when
/// `is_taken` flips to true and cleared when it flips back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub date: NaiveDate,
    /// Clock time as entered, e.g. "08:00". Not validated here; the
    /// trigger scheduler skips tokens it cannot parse.
    pub reminder_time: String,
    pub is_taken: bool,
    pub taken_at: Option<i64>,
}

impl DoseRecord {
    /// A fresh, not-yet-taken record for one (date, time) slot.
    pub fn pending(medicine_id: Uuid, date: NaiveDate, reminder_time: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            medicine_id,
            date,
            reminder_time: reminder_time.to_string(),
            is_taken: false,
            taken_at: None,
        }
    }
}
