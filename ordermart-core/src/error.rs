// ordermart-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrdermartError {
    // --- ERREURS DU DOMAINE (Quality Gate, Join cardinality) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- ERREURS D'INFRASTRUCTURE (IO, Parsing, Parquet) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- ERREURS GÉNÉRIQUES / APPLICATIVES ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for OrdermartError {
    fn from(err: std::io::Error) -> Self {
        OrdermartError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl OrdermartError {
    /// True when the run was rejected by a data check (bad input or broken
    /// stage invariant) rather than by the environment.
    pub fn is_data_failure(&self) -> bool {
        matches!(self, OrdermartError::Domain(_))
    }
}
