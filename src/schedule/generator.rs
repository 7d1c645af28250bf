//! Dose-record generation.
//!
//! Materializes the adherence calendar: one pending record per (date,
//! clock-time) slot across the medicine's date range. Runs on create and
//! on every update; regeneration replaces the medicine's whole record
//! set, so taken marks made under the previous definition are reset.
//! That reset is the documented contract, not an accident.

use chrono::NaiveDate;

use super::occurrence::expand_slots;
use crate::db::{DatabaseError, Store};
use crate::models::{DoseRecord, Medicine};

/// Delete and regenerate every dose record for the medicine, bounded by
/// its end date or, when open-ended, one year from `today`. Returns the
/// number of records written. A multi-year range writes thousands of
/// rows; callers treat this as a bulk operation.
pub fn generate_records(
    store: &Store,
    medicine: &Medicine,
    today: NaiveDate,
) -> Result<usize, DatabaseError> {
    let records: Vec<DoseRecord> = expand_slots(medicine, today)
        .iter()
        .map(|slot| DoseRecord::pending(medicine.id, slot.date, &slot.time))
        .collect();

    let written = store.replace_records_for_medicine(&medicine.id, &records)?;
    tracing::debug!(medicine = %medicine.name, count = written, "generated dose records");
    Ok(written)
}
