//! Medicine lifecycle orchestration.
//!
//! One entry point per user intent: save or delete a medicine, toggle a
//! dose, rearm everything after a reboot. Each save fans out into the
//! two independent projections of the definition — dose records in the
//! store and triggers in the scheduler backend. The projections are not
//! transactional with each other; both are pure functions of the
//! medicine and "now", so re-running a save re-derives both.

use std::sync::Arc;

use chrono::{Local, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{DatabaseError, Store};
use crate::models::{DraftError, Medicine, MedicineDraft};
use crate::schedule::{generate_records, ReminderScheduler, SchedulerBackend};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("Medicine {0} not found")]
    MedicineNotFound(Uuid),

    #[error("Record generation task failed: {0}")]
    GenerationTask(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct MedicineService {
    store: Store,
    scheduler: ReminderScheduler,
}

impl MedicineService {
    pub fn new(store: Store, backend: Arc<dyn SchedulerBackend>) -> Self {
        let scheduler = ReminderScheduler::new(store.clone(), backend);
        Self { store, scheduler }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Create a medicine from form input: normalize, persist, expand its
    /// dose records, arm its reminders. Returns the saved medicine with
    /// its assigned identity.
    pub async fn create_medicine(&self, draft: &MedicineDraft) -> Result<Medicine, ServiceError> {
        let medicine = draft.normalize()?;
        self.store.insert_medicine(&medicine)?;
        tracing::info!(name = %medicine.name, id = %medicine.id, "medicine created");

        self.project(&medicine).await?;
        Ok(medicine)
    }

    /// Replace an existing medicine's definition (identity preserved),
    /// regenerating records and reminders from the new fields.
    pub async fn update_medicine(&self, medicine: &Medicine) -> Result<(), ServiceError> {
        self.store.update_medicine(medicine)?;
        tracing::info!(name = %medicine.name, id = %medicine.id, "medicine updated");

        self.project(medicine).await
    }

    /// Delete a medicine, its dose records, and its armed triggers.
    pub async fn delete_medicine(&self, id: &Uuid) -> Result<(), ServiceError> {
        self.scheduler.cancel_all(id)?;
        self.store.delete_records_for_medicine(id)?;
        self.store.delete_medicine(id)?;
        tracing::info!(%id, "medicine deleted");
        Ok(())
    }

    /// Activate or pause a medicine; pausing silences its reminders but
    /// leaves the adherence calendar intact.
    pub async fn set_active(&self, id: &Uuid, is_active: bool) -> Result<(), ServiceError> {
        self.store.set_active(id, is_active)?;
        let medicine = self
            .store
            .get_medicine(id)?
            .ok_or(ServiceError::MedicineNotFound(*id))?;
        self.scheduler.schedule(&medicine, Local::now())?;
        Ok(())
    }

    /// Toggle one dose record. `taken_at` is stamped with the current
    /// instant on take and cleared on undo.
    pub async fn set_taken(&self, record_id: &Uuid, is_taken: bool) -> Result<(), ServiceError> {
        let taken_at = is_taken.then(|| Utc::now().timestamp_millis());
        self.store.update_taken_status(record_id, is_taken, taken_at)?;
        Ok(())
    }

    /// Boot hook: after a device restart the backend has lost its
    /// triggers, so rearm every active medicine. Dose records persist
    /// and are not regenerated here.
    pub async fn reschedule_all(&self) -> Result<usize, ServiceError> {
        let medicines = self.store.active_medicines()?;
        let now = Local::now();
        for medicine in &medicines {
            self.scheduler.schedule(medicine, now)?;
        }
        tracing::info!(count = medicines.len(), "rescheduled reminders after restart");
        Ok(medicines.len())
    }

    /// Both projections of one definition, derived from the same "now".
    async fn project(&self, medicine: &Medicine) -> Result<(), ServiceError> {
        let now = Local::now();

        // Bulk write: a multi-year range is thousands of rows, so keep it
        // off the async workers.
        let store = self.store.clone();
        let generated = medicine.clone();
        let today = now.date_naive();
        tokio::task::spawn_blocking(move || generate_records(&store, &generated, today))
            .await
            .map_err(|e| ServiceError::GenerationTask(e.to_string()))??;

        self.scheduler.schedule(medicine, now)?;
        Ok(())
    }
}
