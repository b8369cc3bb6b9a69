// ordermart-core/src/domain/run/mod.rs

pub mod metadata;
pub mod metric;
pub mod recorder;

pub use metadata::{CheckOutcome, RunMetadata};
pub use metric::{Counter, QualityCheck, Statistic, TableKind};
pub use recorder::RunRecorder;
