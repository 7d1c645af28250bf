//! Medicine entity and the data-entry boundary around it.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Range accepted for doses per day; anything else is coerced to the minimum.
pub const MIN_TIMES_PER_DAY: u32 = 1;
pub const MAX_TIMES_PER_DAY: u32 = 24;

/// A user-defined dosing schedule.
///
/// `reminder_times` is kept as the raw string the user entered (either a
/// bracketed quoted list or a plain comma list); both the record generator
/// and the trigger scheduler run it through
/// [`crate::reminder_times::parse_reminder_times`] so they agree on the
/// same daily dose slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub purpose: String,
    pub dosage: String,
    pub times_per_day: u32,
    pub reminder_times: String,
    pub start_date: NaiveDate,
    /// `None` means open-ended; expansion bounds it to one year from now.
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub custom_ringtone: Option<String>,
    pub created_at: i64,
}

/// Unvalidated form input for creating or editing a medicine.
///
/// Fields arrive as the dialog captured them; `normalize` is the single
/// place where entry errors are coerced or rejected before anything is
/// persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineDraft {
    pub name: String,
    pub purpose: String,
    pub dosage: String,
    pub times_per_day: String,
    pub reminder_times: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub custom_ringtone: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("Medicine name must not be empty")]
    EmptyName,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl MedicineDraft {
    /// Validate and coerce the draft into a `Medicine` with a fresh identity.
    ///
    /// Doses-per-day that fails to parse or falls outside 1..=24 is coerced
    /// to 1 rather than rejected; dates that are inverted are an error the
    /// dialog must surface.
    pub fn normalize(&self) -> Result<Medicine, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(DraftError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        let times_per_day = self
            .times_per_day
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (MIN_TIMES_PER_DAY..=MAX_TIMES_PER_DAY).contains(n))
            .unwrap_or(MIN_TIMES_PER_DAY);

        Ok(Medicine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            purpose: self.purpose.trim().to_string(),
            dosage: self.dosage.trim().to_string(),
            times_per_day,
            reminder_times: self.reminder_times.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            custom_ringtone: self.custom_ringtone.clone(),
            created_at: Utc::now().timestamp_millis(),
        })
    }
}
