// ordermart-core/src/ports/table_io.rs

// Le domaine ne sait pas d'où viennent les tables (CSV, Parquet, mémoire...)
// ni où elles partent. Les adapters de l'infrastructure branchent ici.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::model::Table;
use crate::error::OrdermartError;

/// Reads a raw table. Every cell comes back as `Value::Text` or `Value::Null`;
/// typing is the Quality Gate's business.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn load(&self, location: &Path, name: &str) -> Result<Table, OrdermartError>;
}

/// Writes finished tables as one group: every table of a run is staged
/// first, then all of them are published by `commit`. A failed `stage`
/// leaves every destination as it was.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// A table written out of sight, not yet visible at its destination.
    type Staged: Send;

    async fn stage(&self, table: &Table, destination: &Path) -> Result<Self::Staged, OrdermartError>;

    async fn commit(&self, staged: Vec<Self::Staged>) -> Result<(), OrdermartError>;

    /// Stage and publish a single table.
    async fn write(&self, table: &Table, destination: &Path) -> Result<(), OrdermartError> {
        let staged = self.stage(table, destination).await?;
        self.commit(vec![staged]).await
    }
}
