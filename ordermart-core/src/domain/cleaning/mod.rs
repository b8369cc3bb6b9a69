// ordermart-core/src/domain/cleaning/mod.rs

pub mod cleaner;
pub mod status;
pub mod winsor;

pub use cleaner::{Cleaner, CleaningOptions, DEFAULT_IQR_MULTIPLIER};
pub use status::{StatusMapper, normalize_text};
pub use winsor::{QuantileMethod, WinsorBounds};
