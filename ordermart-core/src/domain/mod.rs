pub mod analytics;
pub mod cleaning;
pub mod error;
pub mod join;
pub mod model;
pub mod project;
pub mod quality;
pub mod run;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
