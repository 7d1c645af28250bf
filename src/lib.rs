pub mod config;
pub mod db;
pub mod models;
pub mod reminder_times;
pub mod schedule;
pub mod service;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub use db::Store;
pub use schedule::{InMemoryScheduler, SchedulerBackend};
pub use service::MedicineService;

/// Initialize tracing from RUST_LOG, falling back to the app default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

/// Wire the core together: open the store at the default location and
/// hand every component the same injected handles.
pub fn bootstrap(
    backend: Arc<dyn SchedulerBackend>,
) -> Result<MedicineService, service::ServiceError> {
    std::fs::create_dir_all(config::app_data_dir())?;
    let store = Store::open(&config::database_path())?;
    Ok(MedicineService::new(store, backend))
}
