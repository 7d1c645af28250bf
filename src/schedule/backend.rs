//! Scheduler backend seam.
//!
//! The OS alarm facility is reached through `SchedulerBackend`: arm a
//! one-shot trigger at an absolute instant, cancel by identity. The
//! in-memory implementation backs tests and any host without a native
//! alarm service.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// What a fired trigger hands to the notification layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosePayload {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub date: NaiveDate,
    /// Clock token as configured, e.g. "08:00".
    pub time: String,
    pub custom_ringtone: Option<String>,
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler backend rejected trigger {trigger_id}: {reason}")]
    ArmFailed { trigger_id: u32, reason: String },
}

/// One-shot exact-time trigger delivery.
///
/// Implementations must attempt delivery at or after the fire instant
/// even under device idle, and must treat `cancel` of an unknown
/// identity as a no-op.
pub trait SchedulerBackend: Send + Sync {
    fn arm_exact(
        &self,
        trigger_id: u32,
        fire_at_epoch_ms: i64,
        payload: &DosePayload,
    ) -> Result<(), SchedulerError>;

    fn cancel(&self, trigger_id: u32);
}

/// An armed trigger held by [`InMemoryScheduler`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedTrigger {
    pub fire_at_epoch_ms: i64,
    pub payload: DosePayload,
}

/// Hash-map backend for tests and headless hosts.
#[derive(Default)]
pub struct InMemoryScheduler {
    armed: Mutex<HashMap<u32, ArmedTrigger>>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn armed(&self) -> std::sync::MutexGuard<'_, HashMap<u32, ArmedTrigger>> {
        self.armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn armed_count(&self) -> usize {
        self.armed().len()
    }

    pub fn armed_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.armed().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, trigger_id: u32) -> Option<ArmedTrigger> {
        self.armed().get(&trigger_id).cloned()
    }
}

impl SchedulerBackend for InMemoryScheduler {
    fn arm_exact(
        &self,
        trigger_id: u32,
        fire_at_epoch_ms: i64,
        payload: &DosePayload,
    ) -> Result<(), SchedulerError> {
        self.armed().insert(
            trigger_id,
            ArmedTrigger {
                fire_at_epoch_ms,
                payload: payload.clone(),
            },
        );
        Ok(())
    }

    fn cancel(&self, trigger_id: u32) {
        self.armed().remove(&trigger_id);
    }
}
