//! Trigger scheduling: one armed, one-shot notification per future dose
//! slot of an active medicine, with exact bulk cancellation.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::backend::{DosePayload, SchedulerBackend};
use super::occurrence::{expand_slots, fire_instant};
use crate::db::{DatabaseError, Store};
use crate::models::Medicine;

pub struct ReminderScheduler {
    store: Store,
    backend: Arc<dyn SchedulerBackend>,
}

impl ReminderScheduler {
    pub fn new(store: Store, backend: Arc<dyn SchedulerBackend>) -> Self {
        Self { store, backend }
    }

    /// Re-arm all reminders for a medicine as of `now`.
    ///
    /// Previously armed triggers are always cancelled first, even for an
    /// inactive medicine (deactivation must silence it). Slots whose
    /// clock token has no parsable hour, and slots not strictly in the
    /// future, are skipped without aborting the rest.
    pub fn schedule(&self, medicine: &Medicine, now: DateTime<Local>) -> Result<(), DatabaseError> {
        self.cancel_all(&medicine.id)?;

        if !medicine.is_active {
            return Ok(());
        }

        let mut armed = Vec::new();
        for slot in expand_slots(medicine, now.date_naive()) {
            let Some(fire_at) = fire_instant(slot.date, &slot.time) else {
                continue;
            };
            if fire_at <= now {
                continue;
            }

            let trigger_id = trigger_identity(&medicine.id, slot.date, &slot.time);
            let payload = DosePayload {
                medicine_id: medicine.id,
                medicine_name: medicine.name.clone(),
                dosage: medicine.dosage.clone(),
                date: slot.date,
                time: slot.time.clone(),
                custom_ringtone: medicine.custom_ringtone.clone(),
            };

            match self
                .backend
                .arm_exact(trigger_id, fire_at.timestamp_millis(), &payload)
            {
                Ok(()) => armed.push(trigger_id),
                Err(e) => {
                    // One rejected slot should not silence the rest.
                    tracing::warn!(medicine = %medicine.name, "failed to arm trigger: {e}");
                }
            }
        }

        tracing::debug!(
            medicine = %medicine.name,
            count = armed.len(),
            "armed reminder triggers"
        );
        self.store.record_armed_triggers(&medicine.id, &armed)?;
        Ok(())
    }

    /// Cancel every trigger recorded as armed for this medicine.
    pub fn cancel_all(&self, medicine_id: &Uuid) -> Result<(), DatabaseError> {
        let armed = self.store.armed_trigger_ids(medicine_id)?;
        for trigger_id in &armed {
            self.backend.cancel(*trigger_id);
        }
        self.store.clear_armed_triggers(medicine_id)?;

        if !armed.is_empty() {
            tracing::debug!(%medicine_id, count = armed.len(), "cancelled reminder triggers");
        }
        Ok(())
    }
}

/// Stable trigger identity for a (medicine, date, time) slot.
///
/// SHA-256 over the medicine id and the digits of the date and clock
/// token, truncated to a non-negative 31-bit integer. Deterministic
/// across runs so cancellation and re-arming address the same trigger;
/// not meant to be cryptographically meaningful.
pub fn trigger_identity(medicine_id: &Uuid, date: NaiveDate, time: &str) -> u32 {
    let key = format!(
        "{}{}{}",
        medicine_id,
        date.format("%Y%m%d"),
        time.replace(':', "")
    );
    let digest = Sha256::digest(key.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) & 0x7FFF_FFFF
}
