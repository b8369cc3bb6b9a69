// ordermart-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

use datafusion::arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use datafusion::parquet::errors::ParquetError;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(ordermart::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(ordermart::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(ordermart::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid project configuration: {0}")]
    #[diagnostic(
        code(ordermart::infra::config_invalid),
        help("See the 'cleaning' and 'outputs' sections of ordermart.yaml.")
    )]
    InvalidConfig(#[from] validator::ValidationErrors),

    // --- DATA ENGINE ---
    #[error("DataFusion Error: {0}")]
    #[diagnostic(code(ordermart::infra::datafusion))]
    DataFusion(#[from] DataFusionError),

    #[error("Arrow Error: {0}")]
    #[diagnostic(code(ordermart::infra::arrow))]
    Arrow(#[from] ArrowError),

    #[error("Parquet Error: {0}")]
    #[diagnostic(code(ordermart::infra::parquet))]
    Parquet(#[from] ParquetError),

    #[error("Cannot read source '{path}': {reason}")]
    #[diagnostic(
        code(ordermart::infra::source_unreadable),
        help("Check that the raw file exists and is a CSV with a header row.")
    )]
    SourceUnreadable { path: String, reason: String },
}
