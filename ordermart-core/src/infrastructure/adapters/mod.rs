// ordermart-core/src/infrastructure/adapters/mod.rs

pub mod arrow;
pub mod csv_source;
pub mod parquet_sink;

pub use csv_source::CsvSource;
pub use parquet_sink::ParquetSink;
