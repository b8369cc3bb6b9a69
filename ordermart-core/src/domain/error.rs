// ordermart-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- QUALITY GATE (fatal, abort run) ---
    #[error("[{table}] required_columns check failed: missing {missing:?}, unexpected {unexpected:?}")]
    #[diagnostic(
        code(ordermart::quality::schema),
        help("The raw file does not match the declared contract for '{table}'.")
    )]
    SchemaError {
        table: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("[{table}] non_empty check failed: dataset has zero rows")]
    #[diagnostic(code(ordermart::quality::empty))]
    EmptyDatasetError { table: String },

    #[error("[{table}] not_null check failed: column '{column}' has {count} null value(s)")]
    #[diagnostic(
        code(ordermart::quality::not_null),
        help("Keys and event timestamps must be present on every row.")
    )]
    NullValueError {
        table: String,
        column: String,
        count: usize,
    },

    #[error("[{table}] column_types check failed: column '{column}' expects {expected}, got '{value}' (row {row})")]
    #[diagnostic(code(ordermart::quality::types))]
    TypeError {
        table: String,
        column: String,
        expected: String,
        value: String,
        row: usize,
    },

    #[error("[{table}] uniqueness check failed: column '{column}' has DUPLICATE values {duplicates:?}")]
    #[diagnostic(
        code(ordermart::quality::uniqueness),
        help("A key declared unique appears more than once. Deduplicate the source before running.")
    )]
    UniquenessError {
        table: String,
        column: String,
        duplicates: Vec<String>,
    },

    // --- SAFE JOINER (fatal, broken invariant) ---
    #[error("Join cardinality violated on '{key}': {detail}")]
    #[diagnostic(
        code(ordermart::join::cardinality),
        help("The users side must be unique on the join key. An upstream stage broke this invariant.")
    )]
    JoinCardinalityError { key: String, detail: String },

    // --- RECORD CONVERSION ---
    #[error("[{table}] invalid value in column '{column}' at row {row}: {reason}")]
    #[diagnostic(code(ordermart::domain::invalid_value))]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        reason: String,
    },
}

impl DomainError {
    /// Name of the check that produced this error, as reported to the operator.
    pub fn check_name(&self) -> &'static str {
        match self {
            DomainError::SchemaError { .. } => "required_columns",
            DomainError::EmptyDatasetError { .. } => "non_empty",
            DomainError::NullValueError { .. } => "not_null",
            DomainError::TypeError { .. } => "column_types",
            DomainError::UniquenessError { .. } => "uniqueness",
            DomainError::JoinCardinalityError { .. } => "join_cardinality",
            DomainError::InvalidValue { .. } => "record_conversion",
        }
    }
}
