pub mod backend;
pub mod generator;
pub mod occurrence;
pub mod reminders;

pub use backend::{DosePayload, InMemoryScheduler, SchedulerBackend, SchedulerError};
pub use generator::generate_records;
pub use reminders::ReminderScheduler;
