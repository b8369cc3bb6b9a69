// ordermart/src/commands/clean.rs
//
// USE CASE: Clean build artifacts.

use std::path::PathBuf;

use anyhow::Context;
use ordermart_core::application::clean_project;
use ordermart_core::infrastructure::config::load_project_config;

use crate::commands::exit_code;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)
        .with_context(|| format!("Failed to load project configuration from {:?}", project_dir))?;

    match clean_project(&project_dir, &config) {
        Ok(removed) if removed.is_empty() => println!("✨ Nothing to clean."),
        Ok(removed) => println!("✨ Removed {} target(s).", removed.len()),
        Err(e) => {
            eprintln!("❌ Clean failed: {}", e);
            std::process::exit(exit_code(&e));
        }
    }
    Ok(())
}
