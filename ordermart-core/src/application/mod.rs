// ordermart-core/src/application/mod.rs

pub mod clean;
pub mod pipeline;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use ordermart_core::application::{run_pipeline, clean_project, validate_inputs};`

pub use clean::clean_project;
pub use pipeline::{PipelineOutput, RunLayout, RunSummary, run_pipeline, transform};
pub use validation::{ValidationReport, validate_inputs};
