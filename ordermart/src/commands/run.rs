// ordermart/src/commands/run.rs
//
// USE CASE: Run the pipeline.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use comfy_table::{Table, presets::UTF8_FULL};
use ordermart_core::application::run_pipeline;
use ordermart_core::domain::run::RunMetadata;
use ordermart_core::infrastructure::adapters::{CsvSource, ParquetSink};
use ordermart_core::infrastructure::config::load_project_config;

use crate::commands::report_failure;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    // B. Adapters + Pipeline (Application Layer)
    let source = CsvSource::new();
    let sink = ParquetSink;
    let result = run_pipeline(&source, &sink, &project_dir, &config, Utc::now()).await;

    match result {
        Ok(summary) => {
            println!("\n{}", summary_table(&summary.metadata));
            println!("\n✨ SUCCESS! Pipeline finished in {:.2?}", summary.duration);
            tracing::debug!(artifacts = ?summary.artifacts, "run complete");
        }
        Err(e) => {
            let code = report_failure("💥 CRITICAL PIPELINE ERROR", e);
            eprintln!("   No artifacts were published.");
            std::process::exit(code);
        }
    }

    Ok(())
}

fn summary_table(meta: &RunMetadata) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value"]);

    // Les compteurs de checks sont dans quality_checks, on ne les répète pas
    for (key, value) in meta.counters.iter().filter(|(k, _)| !k.starts_with("quality.")) {
        table.add_row(vec![key.clone(), value.to_string()]);
    }
    for (key, value) in &meta.statistics {
        let rendered = value.map_or_else(|| "null".to_string(), |v| format!("{:.4}", v));
        table.add_row(vec![key.clone(), rendered]);
    }
    table
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ordermart_core::domain::run::RunRecorder;

    #[test]
    fn test_summary_lists_join_metrics() {
        let mut recorder = RunRecorder::new();
        recorder.record_join(3, 1);
        let meta = recorder.finish(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let rendered = summary_table(&meta).to_string();
        assert!(rendered.contains("join.unmatched_orders"));
        assert!(rendered.contains("0.7500"));
        assert!(rendered.contains("null"));
        assert!(!rendered.contains("quality.users.uniqueness.failed"));
    }
}
