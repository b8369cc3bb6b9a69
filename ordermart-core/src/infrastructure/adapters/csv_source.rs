// ordermart-core/src/infrastructure/adapters/csv_source.rs

use async_trait::async_trait;
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::prelude::*;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::model::Table;
use crate::error::OrdermartError;
use crate::infrastructure::adapters::arrow::batches_to_text_table;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::table_io::TableSource;

/// Raw CSV loader backed by DataFusion. Every column is read as text: type
/// inference would turn `007` into `7` before the Quality Gate sees it.
pub struct CsvSource {
    ctx: SessionContext,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSource {
    pub fn new() -> Self {
        // Une seule partition : l'ordre des lignes du fichier est conservé.
        let config = SessionConfig::new()
            .with_target_partitions(1)
            .with_repartition_file_scans(false);
        Self {
            ctx: SessionContext::new_with_config(config),
        }
    }

    async fn read(&self, location: &Path, name: &str) -> Result<Table, InfrastructureError> {
        let path_str = location.to_str().ok_or_else(|| unreadable(location, "path is not valid UTF-8"))?;
        let extension = location
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        // 1. Header only: column names
        let header = self
            .ctx
            .read_csv(
                path_str,
                CsvReadOptions::new().has_header(true).file_extension(&extension),
            )
            .await?;
        let text_schema = Schema::new(
            header
                .schema()
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );

        // 2. Full read, all text
        let df = self
            .ctx
            .read_csv(
                path_str,
                CsvReadOptions::new()
                    .has_header(true)
                    .file_extension(&extension)
                    .schema(&text_schema),
            )
            .await?;
        let batches = df.collect().await?;

        batches_to_text_table(name, &text_schema, &batches)
    }
}

#[async_trait]
impl TableSource for CsvSource {
    #[instrument(skip(self), fields(table = %name))]
    async fn load(&self, location: &Path, name: &str) -> Result<Table, OrdermartError> {
        if !location.is_file() {
            return Err(unreadable(location, "file not found").into());
        }

        let table = self.read(location, name).await.map_err(|e| match e {
            InfrastructureError::SourceUnreadable { .. } => e,
            other => unreadable(location, &other.to_string()),
        })?;

        debug!(rows = table.len(), columns = table.columns.len(), "raw table loaded");
        Ok(table)
    }
}

fn unreadable(location: &Path, reason: &str) -> InfrastructureError {
    InfrastructureError::SourceUnreadable {
        path: location.display().to_string(),
        reason: reason.to_string(),
    }
}
