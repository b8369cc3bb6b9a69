// ordermart/src/commands/validate.rs
//
// USE CASE: Dry-run the quality gate on the raw sources.

use std::path::PathBuf;

use anyhow::Context;
use ordermart_core::application::validate_inputs;
use ordermart_core::infrastructure::adapters::CsvSource;
use ordermart_core::infrastructure::config::load_project_config;

use crate::commands::report_failure;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)
        .with_context(|| format!("Failed to load project configuration from {:?}", project_dir))?;

    match validate_inputs(&CsvSource::new(), &project_dir, &config).await {
        Ok(report) => {
            println!(
                "\n✨ Raw sources are valid ({} orders, {} users, {} checks passed)",
                report.orders_rows,
                report.users_rows,
                report.checks.len()
            );
            Ok(())
        }
        Err(e) => {
            let code = report_failure("❌ VALIDATION FAILED", e);
            std::process::exit(code);
        }
    }
}
