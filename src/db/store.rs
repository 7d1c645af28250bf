//! Shared store handle.
//!
//! Explicitly constructed once at startup and handed to whichever
//! components need persistence — there is no ambient global connection.
//! A `watch` generation counter is bumped on every mutation; the
//! `*_stream` methods turn that into live-updating snapshots for the
//! calendar and list screens, re-running their query after each change.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use futures_util::stream::{self, Stream};
use rusqlite::Connection;
use tokio::sync::watch;
use uuid::Uuid;

use super::{repository, sqlite, DatabaseError};
use crate::models::{DoseRecord, Medicine};

#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    conn: Mutex<Connection>,
    changes: watch::Sender<u64>,
}

impl Store {
    /// Open (or create) the database at `path` and wrap it in a handle.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(sqlite::open_database(path)?))
    }

    /// In-memory store (for testing).
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(sqlite::open_memory_database()?))
    }

    fn from_connection(conn: Connection) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                changes,
            }),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another thread panicked mid-query;
        // the connection itself is still usable.
        self.inner
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn mark_changed(&self) {
        self.inner.changes.send_modify(|generation| *generation += 1);
    }

    // ─── Medicines ───────────────────────────────────────────────────

    pub fn insert_medicine(&self, med: &Medicine) -> Result<(), DatabaseError> {
        repository::insert_medicine(&self.conn(), med)?;
        self.mark_changed();
        Ok(())
    }

    pub fn update_medicine(&self, med: &Medicine) -> Result<(), DatabaseError> {
        repository::update_medicine(&self.conn(), med)?;
        self.mark_changed();
        Ok(())
    }

    pub fn delete_medicine(&self, id: &Uuid) -> Result<(), DatabaseError> {
        repository::delete_medicine(&self.conn(), id)?;
        self.mark_changed();
        Ok(())
    }

    pub fn get_medicine(&self, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
        repository::get_medicine_by_id(&self.conn(), id)
    }

    pub fn all_medicines(&self) -> Result<Vec<Medicine>, DatabaseError> {
        repository::get_all_medicines(&self.conn())
    }

    pub fn active_medicines(&self) -> Result<Vec<Medicine>, DatabaseError> {
        repository::get_all_active_medicines(&self.conn())
    }

    pub fn set_active(&self, id: &Uuid, is_active: bool) -> Result<(), DatabaseError> {
        repository::set_active_status(&self.conn(), id, is_active)?;
        self.mark_changed();
        Ok(())
    }

    // ─── Dose records ────────────────────────────────────────────────

    /// Drop every record a medicine has and insert the freshly generated
    /// set, atomically. Returns the number of records written.
    pub fn replace_records_for_medicine(
        &self,
        medicine_id: &Uuid,
        records: &[DoseRecord],
    ) -> Result<usize, DatabaseError> {
        {
            let mut guard = self.conn();
            let tx = guard.transaction()?;
            tx.execute(
                "DELETE FROM dose_records WHERE medicine_id = ?1",
                rusqlite::params![medicine_id.to_string()],
            )?;
            for record in records {
                repository::insert_dose_record(&tx, record)?;
            }
            tx.commit()?;
        }
        self.mark_changed();
        Ok(records.len())
    }

    pub fn delete_records_for_medicine(&self, medicine_id: &Uuid) -> Result<usize, DatabaseError> {
        let deleted = repository::delete_records_for_medicine(&self.conn(), medicine_id)?;
        self.mark_changed();
        Ok(deleted)
    }

    pub fn update_taken_status(
        &self,
        id: &Uuid,
        is_taken: bool,
        taken_at: Option<i64>,
    ) -> Result<(), DatabaseError> {
        repository::update_taken_status(&self.conn(), id, is_taken, taken_at)?;
        self.mark_changed();
        Ok(())
    }

    pub fn records_by_date(&self, date: NaiveDate) -> Result<Vec<DoseRecord>, DatabaseError> {
        repository::get_records_by_date(&self.conn(), date)
    }

    pub fn records_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DoseRecord>, DatabaseError> {
        repository::get_records_by_date_range(&self.conn(), start, end)
    }

    pub fn records_by_medicine_and_date_range(
        &self,
        medicine_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DoseRecord>, DatabaseError> {
        repository::get_records_by_medicine_and_date_range(&self.conn(), medicine_id, start, end)
    }

    pub fn count_records_for_medicine(&self, medicine_id: &Uuid) -> Result<i64, DatabaseError> {
        repository::count_records_for_medicine(&self.conn(), medicine_id)
    }

    // ─── Armed-trigger index ─────────────────────────────────────────

    pub fn record_armed_triggers(
        &self,
        medicine_id: &Uuid,
        trigger_ids: &[u32],
    ) -> Result<(), DatabaseError> {
        repository::record_armed_triggers(&self.conn(), medicine_id, trigger_ids)
    }

    pub fn armed_trigger_ids(&self, medicine_id: &Uuid) -> Result<Vec<u32>, DatabaseError> {
        repository::armed_trigger_ids(&self.conn(), medicine_id)
    }

    pub fn clear_armed_triggers(&self, medicine_id: &Uuid) -> Result<usize, DatabaseError> {
        repository::clear_armed_triggers(&self.conn(), medicine_id)
    }

    // ─── Live queries ────────────────────────────────────────────────

    /// All medicines, newest first, re-emitted after every store change.
    pub fn medicines_stream(&self) -> impl Stream<Item = Vec<Medicine>> {
        self.snapshot_stream(|store| store.all_medicines())
    }

    /// Active medicines only, re-emitted after every store change.
    pub fn active_medicines_stream(&self) -> impl Stream<Item = Vec<Medicine>> {
        self.snapshot_stream(|store| store.active_medicines())
    }

    /// One day of the adherence calendar, re-emitted after every change.
    pub fn records_by_date_stream(&self, date: NaiveDate) -> impl Stream<Item = Vec<DoseRecord>> {
        self.snapshot_stream(move |store| store.records_by_date(date))
    }

    /// A calendar span (e.g. the visible month), re-emitted after every change.
    pub fn records_by_date_range_stream(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Stream<Item = Vec<DoseRecord>> {
        self.snapshot_stream(move |store| store.records_by_date_range(start, end))
    }

    /// Emit a query snapshot immediately, then again after each mutation.
    /// A query that fails mid-stream ends the stream; subscribers simply
    /// resubscribe.
    fn snapshot_stream<T, F>(&self, query: F) -> impl Stream<Item = Vec<T>>
    where
        F: Fn(&Store) -> Result<Vec<T>, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        let rx = self.inner.changes.subscribe();
        stream::unfold(
            (store, rx, query, true),
            |(store, mut rx, query, first)| async move {
                if !first && rx.changed().await.is_err() {
                    return None;
                }
                match query(&store) {
                    Ok(snapshot) => Some((snapshot, (store, rx, query, false))),
                    Err(e) => {
                        tracing::warn!("live query failed: {e}");
                        None
                    }
                }
            },
        )
    }
}
