// ordermart/src/commands/inspect.rs
//
// USE CASE: Inspect a produced Parquet artifact (schema + sample rows).

use datafusion::prelude::*;
use std::path::PathBuf;

pub async fn execute(path: PathBuf, limit: usize) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!(
            "❌ Artifact not found at: {}\n👉 Have you run 'ordermart run'?",
            path.display()
        );
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Path is not valid UTF-8: {:?}", path))?;

    let ctx = SessionContext::new();
    let df = ctx.read_parquet(path_str, ParquetReadOptions::default()).await?;

    println!("\n🔍 Inspecting: '{}'", path.display());
    let columns: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect();
    println!("   Columns: [{}]", columns.join(", "));
    println!("   Rows: {}", df.clone().count().await?);
    println!("   --- Rows (Limit {}) ---", limit);

    df.show_limit(limit).await?;

    Ok(())
}
