pub mod dose_record;
pub mod medicine;
pub mod ui_state;

pub use dose_record::DoseRecord;
pub use medicine::{DraftError, Medicine, MedicineDraft};
pub use ui_state::UiState;
