// ordermart-core/src/infrastructure/adapters/parquet_sink.rs

use async_trait::async_trait;
use datafusion::parquet::arrow::ArrowWriter;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::model::Table;
use crate::error::OrdermartError;
use crate::infrastructure::adapters::arrow::table_to_batch;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{StagedFile, stage_write};
use crate::ports::table_io::TableSink;

/// Columnar output. Each file is encoded in memory and staged next to its
/// destination; `commit` renames the staged files into place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetSink;

pub fn encode_parquet(table: &Table) -> Result<Vec<u8>, InfrastructureError> {
    let batch = table_to_batch(table)?;
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buffer)
}

#[async_trait]
impl TableSink for ParquetSink {
    type Staged = StagedFile;

    #[instrument(skip(self, table), fields(table = %table.name))]
    async fn stage(&self, table: &Table, destination: &Path) -> Result<StagedFile, OrdermartError> {
        let bytes = encode_parquet(table)?;
        let staged = stage_write(destination, &bytes)?;
        debug!(rows = table.len(), bytes = bytes.len(), path = ?destination, "parquet staged");
        Ok(staged)
    }

    async fn commit(&self, staged: Vec<StagedFile>) -> Result<(), OrdermartError> {
        for file in staged {
            let path = file.destination().to_path_buf();
            file.commit()?;
            debug!(path = ?path, "parquet committed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::{ColumnDef, ColumnType, Value};
    use anyhow::Result;
    use datafusion::arrow::datatypes::{DataType, TimeUnit};
    use datafusion::prelude::*;
    use tempfile::tempdir;

    fn sample() -> Table {
        let mut table = Table::new(
            "orders_clean",
            vec![
                ColumnDef::new("order_id", ColumnType::Text),
                ColumnDef::new("amount", ColumnType::Float),
                ColumnDef::new("timestamp", ColumnType::Timestamp),
            ],
        );
        table.push_row(vec![
            Value::Text("o1".into()),
            Value::Float(10.0),
            Value::Text("2024-01-01T10:00:00Z".into()),
        ]);
        table.push_row(vec![Value::Text("o2".into()), Value::Null, Value::Text("2024-01-02".into())]);
        table
    }

    #[tokio::test]
    async fn test_written_file_reads_back_with_native_types() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("processed/orders_clean.parquet");

        ParquetSink.write(&sample(), &path).await?;

        let ctx = SessionContext::new();
        let df = ctx
            .read_parquet(path.to_str().unwrap(), ParquetReadOptions::default())
            .await?;
        let schema = df.schema().clone();
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(
            schema.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );
        assert_eq!(df.count().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_stage_keeps_previous_generation() -> Result<()> {
        let dir = tempdir()?;
        let orders_path = dir.path().join("orders_clean.parquet");
        let users_path = dir.path().join("users.parquet");
        std::fs::write(&orders_path, b"previous orders")?;
        std::fs::write(&users_path, b"previous users")?;

        let mut broken = Table::new("users_clean", vec![ColumnDef::new("age", ColumnType::Float)]);
        broken.push_row(vec![Value::Text("not a number".into())]);

        let staged = ParquetSink.stage(&sample(), &orders_path).await?;
        assert!(ParquetSink.stage(&broken, &users_path).await.is_err());
        drop(staged);

        assert_eq!(std::fs::read(&orders_path)?, b"previous orders");
        assert_eq!(std::fs::read(&users_path)?, b"previous users");
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode_parquet(&sample()).unwrap(), encode_parquet(&sample()).unwrap());
    }
}
