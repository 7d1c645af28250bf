pub mod dose_record;
pub mod medicine;
pub mod trigger_index;

pub use dose_record::*;
pub use medicine::*;
pub use trigger_index::*;
